//! Condition-keyed configuration store.
//!
//! A [`ConfigStore`] maps condition keys to [`VariableSet`]s. The
//! [`ConfigKey::Universal`] entry always exists and describes any platform the
//! store does not name. Every platform entry is fully resolved: it already
//! carries the unconditional variables of the descriptor it came from.
//!
//! # Invariants
//!
//! - Platform keys are pairwise disjoint.
//! - Each entry holds at most one `command` and one `relative_cwd`.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use thiserror::Error;
use tracing::debug;

use crate::config::EngineConfig;
use crate::descriptor::{Descriptor, DescriptorError, extract_comment};
use crate::variables::{MergeConflict, ReadOnly, VariableSet};

/// Set of platform labels.
pub type PlatformSet = BTreeSet<String>;

/// Key of a [`ConfigStore`] entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigKey {
  /// Applies to every platform without an entry of its own.
  Universal,
  /// Applies only to the listed platforms.
  Platforms(PlatformSet),
}

impl ConfigKey {
  /// Key for a single platform.
  pub fn platform(name: impl Into<String>) -> Self {
    Self::Platforms(BTreeSet::from([name.into()]))
  }

  /// True when the key applies to `platform` explicitly.
  pub fn names(&self, platform: &str) -> bool {
    match self {
      Self::Universal => false,
      Self::Platforms(set) => set.contains(platform),
    }
  }

  fn overlaps(&self, other: &ConfigKey) -> bool {
    match (self, other) {
      (Self::Platforms(a), Self::Platforms(b)) => !a.is_disjoint(b),
      _ => false,
    }
  }
}

impl fmt::Display for ConfigKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Universal => f.write_str("<universal>"),
      Self::Platforms(set) => {
        let labels: Vec<_> = set.iter().map(String::as_str).collect();
        write!(f, "{{{}}}", labels.join(", "))
      }
    }
  }
}

/// Errors raised while building or combining stores.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
  #[error("merge conflict under condition {condition}: {source}")]
  Conflict {
    condition: String,
    #[source]
    source: MergeConflict,
  },

  #[error("condition keys {left} and {right} overlap")]
  OverlappingKeys { left: String, right: String },
}

/// Condition-keyed variable sets plus the descriptor's leading comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigStore {
  entries: BTreeMap<ConfigKey, VariableSet>,
  file_comment: Option<String>,
}

impl Default for ConfigStore {
  fn default() -> Self {
    Self::new(Vec::<String>::new(), None)
  }
}

impl ConfigStore {
  /// Create a store with an empty entry for each platform and for
  /// [`ConfigKey::Universal`].
  pub fn new<I, S>(platforms: I, file_comment: Option<String>) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let mut entries = BTreeMap::new();
    entries.insert(ConfigKey::Universal, VariableSet::new());
    for platform in platforms {
      entries.insert(ConfigKey::platform(platform), VariableSet::new());
    }
    Self {
      entries,
      file_comment: file_comment.filter(|c| !c.is_empty()),
    }
  }

  pub fn file_comment(&self) -> Option<&str> {
    self.file_comment.as_deref()
  }

  /// The entry used for platforms the store does not name.
  pub fn universal(&self) -> &VariableSet {
    self.entries.get(&ConfigKey::Universal).unwrap_or(&EMPTY)
  }

  pub fn get(&self, key: &ConfigKey) -> Option<&VariableSet> {
    self.entries.get(key)
  }

  /// All entries in key order, [`ConfigKey::Universal`] first.
  pub fn entries(&self) -> impl Iterator<Item = (&ConfigKey, &VariableSet)> {
    self.entries.iter()
  }

  /// Every platform label named by a key.
  pub fn known_platforms(&self) -> PlatformSet {
    self
      .entries
      .keys()
      .filter_map(|key| match key {
        ConfigKey::Platforms(set) => Some(set.iter().cloned()),
        ConfigKey::Universal => None,
      })
      .flatten()
      .collect()
  }

  /// Insert or replace an entry.
  ///
  /// # Errors
  ///
  /// Fails when the key overlaps a different existing key.
  pub fn insert(&mut self, key: ConfigKey, vars: VariableSet) -> Result<(), StoreError> {
    if let Some(existing) = self.entries.keys().find(|k| **k != key && k.overlaps(&key)) {
      return Err(StoreError::OverlappingKeys {
        left: existing.to_string(),
        right: key.to_string(),
      });
    }
    self.entries.insert(key, vars);
    Ok(())
  }

  /// Merge unconditional variables into every entry.
  pub fn add_globals(&mut self, vars: &VariableSet) -> Result<(), StoreError> {
    self.merge_where(vars, |_| Ok(true))
  }

  /// Merge variables into the entries of `platforms`.
  pub fn add_values(&mut self, platforms: &PlatformSet, vars: &VariableSet) -> Result<(), StoreError> {
    self.merge_where(vars, |key| match key {
      ConfigKey::Universal => Ok(false),
      ConfigKey::Platforms(set) => classify(key, set, platforms).map(|overlap| overlap == Overlap::Inside),
    })
  }

  /// Merge variables into every entry except those of `platforms`.
  ///
  /// This includes [`ConfigKey::Universal`], so platforms the store does not
  /// name receive them too.
  pub fn add_negative_values(&mut self, platforms: &PlatformSet, vars: &VariableSet) -> Result<(), StoreError> {
    self.merge_where(vars, |key| match key {
      ConfigKey::Universal => Ok(true),
      ConfigKey::Platforms(set) => classify(key, set, platforms).map(|overlap| overlap == Overlap::Outside),
    })
  }

  fn merge_where<F>(&mut self, vars: &VariableSet, mut select: F) -> Result<(), StoreError>
  where
    F: FnMut(&ConfigKey) -> Result<bool, StoreError>,
  {
    if vars.is_empty() {
      return Ok(());
    }
    for (key, entry) in self.entries.iter_mut() {
      if select(key)? {
        *entry = entry.merge(vars).map_err(|source| StoreError::Conflict {
          condition: key.to_string(),
          source,
        })?;
      }
    }
    Ok(())
  }

  /// The resolved variables for one platform.
  pub fn resolve(&self, platform: &str) -> &VariableSet {
    self
      .entries
      .iter()
      .find(|(key, _)| key.names(platform))
      .map(|(_, vars)| vars)
      .unwrap_or_else(|| self.universal())
  }

  /// Combine two stores into a new one.
  ///
  /// For every key of either side, the entries are merged; a side without
  /// the key contributes its universal entry. The left file comment wins.
  ///
  /// # Errors
  ///
  /// [`StoreError::Conflict`] when both sides set different scalars for the
  /// same condition, [`StoreError::OverlappingKeys`] when keys of the two
  /// sides overlap without being identical.
  pub fn union(&self, rhs: &ConfigStore) -> Result<ConfigStore, StoreError> {
    let keys: BTreeSet<&ConfigKey> = self.entries.keys().chain(rhs.entries.keys()).collect();

    let mut entries = BTreeMap::new();
    for key in keys {
      let left = self.entries.get(key).unwrap_or_else(|| self.universal());
      let right = rhs.entries.get(key).unwrap_or_else(|| rhs.universal());
      let merged = left.merge(right).map_err(|source| StoreError::Conflict {
        condition: key.to_string(),
        source,
      })?;

      if let Some(existing) = entries.keys().find(|k: &&ConfigKey| k.overlaps(key)) {
        return Err(StoreError::OverlappingKeys {
          left: existing.to_string(),
          right: key.to_string(),
        });
      }
      entries.insert(key.clone(), merged);
    }

    debug!(
      left = self.entries.len(),
      right = rhs.entries.len(),
      merged = entries.len(),
      "union of configuration stores"
    );

    Ok(ConfigStore {
      entries,
      file_comment: self.file_comment.clone().or_else(|| rhs.file_comment.clone()),
    })
  }

  /// Project the store onto `platforms`, one resolved set per platform.
  ///
  /// An empty platform set gives an empty map; the universal projection is
  /// then [`ConfigStore::universal`].
  pub fn flatten(&self, platforms: &PlatformSet) -> BTreeMap<String, VariableSet> {
    platforms
      .iter()
      .map(|platform| (platform.clone(), self.resolve(platform).clone()))
      .collect()
  }

  /// [`ConfigStore::flatten`] over [`ConfigStore::known_platforms`].
  pub fn flatten_known(&self) -> BTreeMap<String, VariableSet> {
    self.flatten(&self.known_platforms())
  }
}

/// What one platform needs, read straight from descriptor text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformDeps {
  pub command: Vec<String>,
  /// Tracked entries followed by untracked entries.
  pub infiles: Vec<String>,
  pub touched: Vec<String>,
  pub read_only: Option<ReadOnly>,
}

/// Parse descriptor text and resolve it for a single platform.
///
/// `includes` are not followed; use [`crate::descriptor::load_file`] for that.
pub fn load_for_platform(text: &str, platform: &str, config: &EngineConfig) -> Result<PlatformDeps, DescriptorError> {
  let store = Descriptor::parse(text, config)?.to_store(Some(extract_comment(text)), config)?;
  let vars = store.resolve(platform);
  debug!(platform, infiles = vars.tracked.len() + vars.untracked.len(), "resolved platform");
  Ok(PlatformDeps {
    command: vars.command.clone(),
    infiles: vars.infiles(),
    touched: vars.touched.clone(),
    read_only: vars.read_only,
  })
}

static EMPTY: VariableSet = VariableSet {
  command: Vec::new(),
  relative_cwd: None,
  read_only: None,
  tracked: Vec::new(),
  untracked: Vec::new(),
  touched: Vec::new(),
};

#[derive(Debug, PartialEq, Eq)]
enum Overlap {
  Inside,
  Outside,
}

fn classify(key: &ConfigKey, set: &PlatformSet, platforms: &PlatformSet) -> Result<Overlap, StoreError> {
  if set.is_subset(platforms) {
    Ok(Overlap::Inside)
  } else if set.is_disjoint(platforms) {
    Ok(Overlap::Outside)
  } else {
    Err(StoreError::OverlappingKeys {
      left: key.to_string(),
      right: ConfigKey::Platforms(platforms.clone()).to_string(),
    })
  }
}
