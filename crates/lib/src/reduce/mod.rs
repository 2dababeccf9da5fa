//! Collapsing per-platform variables back into conditional form.
//!
//! The pipeline is:
//!
//! 1. [`invert_map`]: `platform -> VariableSet` becomes
//!    `category -> value -> platforms`.
//! 2. [`reduce_inputs`]: every platform set gets a [`Condition`], choosing the
//!    shorter of the positive and negated forms.
//! 3. [`convert_map_to_isolate_dict`]: conditions are grouped into descriptor
//!    clauses.
//!
//! [`canonicalize`] runs the whole pipeline on a [`ConfigStore`].

mod dict;
mod invert;
mod minimize;

use std::collections::BTreeMap;

use thiserror::Error;

use crate::descriptor::Descriptor;
use crate::store::{ConfigStore, PlatformSet};
use crate::variables::{Category, ReadOnly};

pub use dict::convert_map_to_isolate_dict;
pub use invert::{Inverted, invert_map};
pub use minimize::reduce_inputs;

/// Errors raised by reduction and dict building.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReduceError {
  #[error("{category} has more than one value on platform '{platform}'")]
  Inconsistent { category: Category, platform: String },

  #[error("{category} value references unknown platform '{platform}'")]
  UnknownPlatform { category: Category, platform: String },
}

/// Rebuild the canonical descriptor of a store.
///
/// A store naming no platform holds only universal data, which becomes the
/// unconditional variables.
pub fn canonicalize(store: &ConfigStore) -> Result<Descriptor, ReduceError> {
  let platforms = store.known_platforms();
  if platforms.is_empty() {
    return Ok(Descriptor {
      variables: store.universal().sorted(),
      ..Default::default()
    });
  }

  let (inverted, observed) = invert_map(&store.flatten(&platforms));
  let reduced = reduce_inputs(&inverted, &observed)?;
  convert_map_to_isolate_dict(&reduced)
}

/// Where a value applies.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Condition {
  /// On every platform.
  Always,
  /// Only on the listed platforms.
  Only(PlatformSet),
  /// On every platform except the listed ones.
  Except(PlatformSet),
}

impl Condition {
  /// The label set of the clause this condition belongs to, if any.
  pub fn clause(&self) -> Option<&PlatformSet> {
    match self {
      Self::Always => None,
      Self::Only(set) | Self::Except(set) => Some(set),
    }
  }

  pub fn applies(&self, platform: &str) -> bool {
    match self {
      Self::Always => true,
      Self::Only(set) => set.contains(platform),
      Self::Except(set) => !set.contains(platform),
    }
  }
}

/// Reduced form of an [`Inverted`] map, one condition per value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reduced {
  pub command: BTreeMap<Vec<String>, Condition>,
  pub relative_cwd: BTreeMap<String, Condition>,
  pub read_only: BTreeMap<ReadOnly, Condition>,
  pub tracked: BTreeMap<String, Condition>,
  pub untracked: BTreeMap<String, Condition>,
  pub touched: BTreeMap<String, Condition>,
}

impl Reduced {
  pub fn paths(&self, category: Category) -> Option<&BTreeMap<String, Condition>> {
    match category {
      Category::Tracked => Some(&self.tracked),
      Category::Untracked => Some(&self.untracked),
      Category::Touched => Some(&self.touched),
      _ => None,
    }
  }

  fn paths_mut(&mut self, category: Category) -> Option<&mut BTreeMap<String, Condition>> {
    match category {
      Category::Tracked => Some(&mut self.tracked),
      Category::Untracked => Some(&mut self.untracked),
      Category::Touched => Some(&mut self.touched),
      _ => None,
    }
  }
}
