use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::{Condition, Inverted, ReduceError, Reduced};
use crate::store::PlatformSet;
use crate::variables::{Category, ReadOnly};

#[derive(Debug, Clone, Copy)]
enum Slot<'a> {
  Command(&'a Vec<String>),
  RelativeCwd(&'a String),
  ReadOnly(ReadOnly),
  Path(Category, &'a String),
}

#[derive(Debug)]
struct Item<'a> {
  slot: Slot<'a>,
  platforms: PlatformSet,
}

/// Assign a condition to every value of `inverted`.
///
/// `platforms` is the observed platform set. A value present everywhere is
/// [`Condition::Always`]; otherwise the shorter of the value's set and its
/// complement is emitted. When both have the same size, the form matching a
/// clause already chosen for another value is reused so values share clauses.
///
/// Path entries are pruned first. Platforms on which a stronger kind
/// (tracked over untracked over touched) already lists the same path are
/// removed from the weaker entry, which is dropped when nothing is left.
/// An entry covered by a directory entry (`dir/`) with the same platform set
/// is dropped too.
///
/// # Errors
///
/// [`ReduceError::Inconsistent`] when a scalar category holds two values on
/// one platform, [`ReduceError::UnknownPlatform`] when a value names a
/// platform outside `platforms`.
pub fn reduce_inputs(inverted: &Inverted, platforms: &PlatformSet) -> Result<Reduced, ReduceError> {
  check_scalar(Category::Command, inverted.command.values(), platforms)?;
  check_scalar(Category::RelativeCwd, inverted.relative_cwd.values(), platforms)?;
  check_scalar(Category::ReadOnly, inverted.read_only.values(), platforms)?;

  let mut items = Vec::new();
  items.extend(inverted.command.iter().map(|(v, s)| Item {
    slot: Slot::Command(v),
    platforms: s.clone(),
  }));
  items.extend(inverted.relative_cwd.iter().map(|(v, s)| Item {
    slot: Slot::RelativeCwd(v),
    platforms: s.clone(),
  }));
  items.extend(inverted.read_only.iter().map(|(v, s)| Item {
    slot: Slot::ReadOnly(*v),
    platforms: s.clone(),
  }));

  for category in Category::PATHS {
    let Some(map) = inverted.paths(category) else {
      continue;
    };
    for (path, set) in map {
      check_known(category, set, platforms)?;
      let remaining = not_in_stronger_kind(inverted, category, path, set);
      if remaining.is_empty() {
        warn!(%category, %path, "dropping entry already listed by a stronger kind");
        continue;
      }
      if remaining.len() < set.len() {
        debug!(%category, %path, kept = remaining.len(), "narrowed entry listed by a stronger kind");
      }
      if let Some(dir) = covering_directory(inverted, path, &remaining) {
        warn!(%category, %path, dir, "dropping entry covered by a directory");
        continue;
      }
      items.push(Item {
        slot: Slot::Path(category, path),
        platforms: remaining,
      });
    }
  }

  items.retain(|item| !item.platforms.is_empty());
  items.sort_by(|a, b| (a.platforms.len(), &a.platforms).cmp(&(b.platforms.len(), &b.platforms)));

  let mut clauses: Vec<PlatformSet> = Vec::new();
  let mut chosen: Vec<Option<Condition>> = vec![None; items.len()];

  for (item, slot) in items.iter().zip(chosen.iter_mut()) {
    let complement: PlatformSet = platforms.difference(&item.platforms).cloned().collect();
    let condition = if complement.is_empty() {
      Condition::Always
    } else if item.platforms.len() < complement.len() {
      Condition::Only(item.platforms.clone())
    } else if item.platforms.len() > complement.len() {
      Condition::Except(complement)
    } else {
      continue;
    };
    register(&mut clauses, &condition);
    *slot = Some(condition);
  }

  for (item, slot) in items.iter().zip(chosen.iter_mut()) {
    if slot.is_some() {
      continue;
    }
    let complement: PlatformSet = platforms.difference(&item.platforms).cloned().collect();
    let positive = clauses.iter().position(|c| *c == item.platforms);
    let negative = clauses.iter().position(|c| *c == complement);
    let condition = match (positive, negative) {
      (Some(p), Some(n)) if n < p => Condition::Except(complement),
      (None, Some(_)) => Condition::Except(complement),
      _ => Condition::Only(item.platforms.clone()),
    };
    debug!(?condition, "tie resolved");
    register(&mut clauses, &condition);
    *slot = Some(condition);
  }

  let mut reduced = Reduced::default();
  for (item, condition) in items.iter().zip(chosen) {
    let Some(condition) = condition else {
      continue;
    };
    match item.slot {
      Slot::Command(v) => {
        reduced.command.insert(v.clone(), condition);
      }
      Slot::RelativeCwd(v) => {
        reduced.relative_cwd.insert(v.clone(), condition);
      }
      Slot::ReadOnly(v) => {
        reduced.read_only.insert(v, condition);
      }
      Slot::Path(category, path) => {
        if let Some(map) = reduced.paths_mut(category) {
          map.insert(path.clone(), condition);
        }
      }
    }
  }

  debug!(values = items.len(), clauses = clauses.len(), "reduced inputs");
  Ok(reduced)
}

fn register(clauses: &mut Vec<PlatformSet>, condition: &Condition) {
  if let Some(set) = condition.clause()
    && !clauses.contains(set)
  {
    clauses.push(set.clone());
  }
}

fn check_known(category: Category, set: &PlatformSet, platforms: &PlatformSet) -> Result<(), ReduceError> {
  match set.difference(platforms).next() {
    Some(platform) => Err(ReduceError::UnknownPlatform {
      category,
      platform: platform.clone(),
    }),
    None => Ok(()),
  }
}

fn check_scalar<'a, I>(category: Category, sets: I, platforms: &PlatformSet) -> Result<(), ReduceError>
where
  I: Iterator<Item = &'a PlatformSet>,
{
  let mut seen = PlatformSet::new();
  for set in sets {
    check_known(category, set, platforms)?;
    if let Some(platform) = set.intersection(&seen).next() {
      return Err(ReduceError::Inconsistent {
        category,
        platform: platform.clone(),
      });
    }
    seen.extend(set.iter().cloned());
  }
  Ok(())
}

/// `set` minus the platforms on which a stronger kind lists `path`.
fn not_in_stronger_kind(inverted: &Inverted, category: Category, path: &str, set: &PlatformSet) -> PlatformSet {
  Category::PATHS
    .iter()
    .take_while(|stronger| **stronger != category)
    .filter_map(|stronger| inverted.paths(*stronger)?.get(path))
    .fold(set.clone(), |remaining, stronger| remaining.difference(stronger).cloned().collect())
}

fn covering_directory<'a>(inverted: &'a Inverted, path: &str, set: &PlatformSet) -> Option<&'a str> {
  Category::PATHS
    .iter()
    .filter_map(|category| inverted.paths(*category))
    .flat_map(BTreeMap::iter)
    .find(|(dir, dir_set)| {
      dir.ends_with('/') && dir.as_str() != path && path.starts_with(dir.as_str()) && *dir_set == set
    })
    .map(|(dir, _)| dir.as_str())
}
