use std::collections::BTreeMap;

use crate::store::PlatformSet;
use crate::variables::{Category, ReadOnly, VariableSet};

/// `category -> value -> platforms where the value holds`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inverted {
  pub command: BTreeMap<Vec<String>, PlatformSet>,
  pub relative_cwd: BTreeMap<String, PlatformSet>,
  pub read_only: BTreeMap<ReadOnly, PlatformSet>,
  pub tracked: BTreeMap<String, PlatformSet>,
  pub untracked: BTreeMap<String, PlatformSet>,
  pub touched: BTreeMap<String, PlatformSet>,
}

impl Inverted {
  pub fn paths(&self, category: Category) -> Option<&BTreeMap<String, PlatformSet>> {
    match category {
      Category::Tracked => Some(&self.tracked),
      Category::Untracked => Some(&self.untracked),
      Category::Touched => Some(&self.touched),
      _ => None,
    }
  }

  fn paths_mut(&mut self, category: Category) -> Option<&mut BTreeMap<String, PlatformSet>> {
    match category {
      Category::Tracked => Some(&mut self.tracked),
      Category::Untracked => Some(&mut self.untracked),
      Category::Touched => Some(&mut self.touched),
      _ => None,
    }
  }
}

/// Invert a per-platform map.
///
/// Returns the inverted map and the set of observed platforms. Unset scalars
/// (empty `command`, absent `relative_cwd` or `read_only`) are skipped.
pub fn invert_map(flat: &BTreeMap<String, VariableSet>) -> (Inverted, PlatformSet) {
  let mut inverted = Inverted::default();
  let mut platforms = PlatformSet::new();

  for (platform, vars) in flat {
    platforms.insert(platform.clone());
    let note = |set: &mut PlatformSet| {
      set.insert(platform.clone());
    };

    if !vars.command.is_empty() {
      note(inverted.command.entry(vars.command.clone()).or_default());
    }
    if let Some(cwd) = &vars.relative_cwd {
      note(inverted.relative_cwd.entry(cwd.clone()).or_default());
    }
    if let Some(mode) = vars.read_only {
      note(inverted.read_only.entry(mode).or_default());
    }
    for category in Category::PATHS {
      if let Some(map) = inverted.paths_mut(category) {
        for path in vars.paths(category) {
          note(map.entry(path.clone()).or_default());
        }
      }
    }
  }

  (inverted, platforms)
}
