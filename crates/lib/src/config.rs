//! Engine configuration.
//!
//! The configuration is an explicit value handed to the parsing and
//! dict-building functions. Nothing in the crate reads process-wide state
//! except [`EngineConfig::from_env`].

use std::collections::BTreeSet;

use crate::consts::{DEFAULT_CONDITION_VAR, ENV_CONDITION_VAR, ENV_PLATFORMS};

/// Settings shared by descriptor loading and canonical output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
  /// Name of the variable tested in condition expressions.
  pub variable: String,
  /// Platforms to consider in addition to those named by descriptors.
  pub platforms: BTreeSet<String>,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      variable: DEFAULT_CONDITION_VAR.to_string(),
      platforms: BTreeSet::new(),
    }
  }
}

impl EngineConfig {
  /// Build a configuration from `ISODEP_CONDITION_VAR` and `ISODEP_PLATFORMS`.
  ///
  /// Unset or empty variables fall back to the defaults.
  pub fn from_env() -> Self {
    let mut config = Self::default();

    if let Ok(var) = std::env::var(ENV_CONDITION_VAR) {
      let var = var.trim();
      if !var.is_empty() {
        config.variable = var.to_string();
      }
    }

    if let Ok(list) = std::env::var(ENV_PLATFORMS) {
      config.platforms = parse_platform_list(&list);
    }

    config
  }

  /// Add platforms on top of the configured set.
  pub fn with_platforms<I, S>(mut self, platforms: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.platforms.extend(platforms.into_iter().map(Into::into));
    self
  }
}

fn parse_platform_list(list: &str) -> BTreeSet<String> {
  list
    .split(',')
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(str::to_string)
    .collect()
}
