use std::collections::BTreeMap;

use super::{Condition, ReduceError, Reduced};
use crate::descriptor::{Clause, Descriptor, Expr};
use crate::store::PlatformSet;
use crate::variables::{Category, VariableSet};

#[derive(Default)]
struct Branches {
  then: VariableSet,
  otherwise: VariableSet,
}

/// Group reduced values into a canonical [`Descriptor`].
///
/// [`Condition::Always`] values become unconditional variables. For a label
/// set `L`, `Only(L)` values fill the then-branch of the clause for `L` and
/// `Except(L)` values fill its else-branch. Clauses come out sorted by label
/// set and path lists sorted.
///
/// # Errors
///
/// [`ReduceError::Inconsistent`] when two values of a scalar category land
/// in the same branch.
pub fn convert_map_to_isolate_dict(reduced: &Reduced) -> Result<Descriptor, ReduceError> {
  let mut variables = VariableSet::new();
  let mut clauses: BTreeMap<PlatformSet, Branches> = BTreeMap::new();

  for (command, condition) in &reduced.command {
    let target = branch(&mut variables, &mut clauses, condition);
    if !target.command.is_empty() {
      return Err(inconsistent(Category::Command, condition));
    }
    target.command = command.clone();
  }

  for (cwd, condition) in &reduced.relative_cwd {
    let target = branch(&mut variables, &mut clauses, condition);
    if target.relative_cwd.is_some() {
      return Err(inconsistent(Category::RelativeCwd, condition));
    }
    target.relative_cwd = Some(cwd.clone());
  }

  for (mode, condition) in &reduced.read_only {
    let target = branch(&mut variables, &mut clauses, condition);
    if target.read_only.is_some() {
      return Err(inconsistent(Category::ReadOnly, condition));
    }
    target.read_only = Some(*mode);
  }

  for category in Category::PATHS {
    let Some(map) = reduced.paths(category) else {
      continue;
    };
    for (path, condition) in map {
      let target = branch(&mut variables, &mut clauses, condition);
      // Keys are unique within a map, so this cannot see a duplicate.
      if target.push_path(category, path.clone()).is_err() {
        return Err(inconsistent(category, condition));
      }
    }
  }

  let conditions = clauses
    .into_iter()
    .map(|(labels, branches)| Clause {
      condition: Expr { platforms: labels },
      then: branches.then,
      otherwise: Some(branches.otherwise).filter(|vars| !vars.is_empty()),
    })
    .collect();

  Ok(Descriptor {
    includes: Vec::new(),
    variables,
    conditions,
  })
}

fn branch<'a>(
  variables: &'a mut VariableSet,
  clauses: &'a mut BTreeMap<PlatformSet, Branches>,
  condition: &Condition,
) -> &'a mut VariableSet {
  match condition {
    Condition::Always => variables,
    Condition::Only(labels) => &mut clauses.entry(labels.clone()).or_default().then,
    Condition::Except(labels) => &mut clauses.entry(labels.clone()).or_default().otherwise,
  }
}

fn inconsistent(category: Category, condition: &Condition) -> ReduceError {
  let platform = condition
    .clause()
    .and_then(|labels| labels.iter().next().cloned())
    .unwrap_or_else(|| "*".to_string());
  ReduceError::Inconsistent { category, platform }
}
