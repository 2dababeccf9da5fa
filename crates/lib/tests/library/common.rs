use std::collections::{BTreeMap, BTreeSet};

use isodep_lib::config::EngineConfig;
use isodep_lib::descriptor::{Descriptor, DescriptorError};
pub use isodep_lib::reduce::canonicalize;
use isodep_lib::store::ConfigStore;
use isodep_lib::variables::VariableSet;

/// Four platforms, one of which no descriptor names.
pub fn retro_config() -> EngineConfig {
  EngineConfig::default().with_platforms(["dendy"])
}

pub fn parse_store(text: &str, config: &EngineConfig) -> Result<ConfigStore, DescriptorError> {
  Ok(Descriptor::parse(text, config)?.into_store(config)?)
}

/// Per-platform view with sorted path lists.
pub fn sorted_view(store: &ConfigStore, platforms: &BTreeSet<String>) -> BTreeMap<String, VariableSet> {
  store
    .flatten(platforms)
    .into_iter()
    .map(|(platform, vars)| (platform, vars.sorted()))
    .collect()
}

pub fn labels(items: &[&str]) -> BTreeSet<String> {
  items.iter().map(|s| s.to_string()).collect()
}

pub fn strings(items: &[&str]) -> Vec<String> {
  items.iter().map(|s| s.to_string()).collect()
}
