//! Loading descriptor files and their includes.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::{Descriptor, DescriptorError, extract_comment};
use crate::config::EngineConfig;
use crate::store::ConfigStore;

/// Load one descriptor file, following `includes` recursively.
///
/// Include paths are relative to the including file. Each included store is
/// unioned into the including one, the includer being the left operand, so
/// the includer's file comment wins.
pub fn load_file(path: &Path, config: &EngineConfig) -> Result<ConfigStore, DescriptorError> {
  let mut stack = Vec::new();
  load_recursive(path, config, &mut stack)
}

/// Load several descriptor files and union them in order.
pub fn load_files<P: AsRef<Path>>(paths: &[P], config: &EngineConfig) -> Result<ConfigStore, DescriptorError> {
  let mut store = ConfigStore::default();
  for path in paths {
    let loaded = load_file(path.as_ref(), config)?;
    store = store.union(&loaded).map_err(|e| in_file(path.as_ref(), e.into()))?;
  }
  Ok(store)
}

fn load_recursive(path: &Path, config: &EngineConfig, stack: &mut Vec<PathBuf>) -> Result<ConfigStore, DescriptorError> {
  let canonical = dunce::canonicalize(path).map_err(|source| DescriptorError::Read {
    path: path.to_path_buf(),
    source,
  })?;
  if stack.contains(&canonical) {
    return Err(DescriptorError::IncludeCycle(canonical));
  }

  info!(path = %canonical.display(), "loading descriptor");
  let text = fs::read_to_string(&canonical).map_err(|source| DescriptorError::Read {
    path: canonical.clone(),
    source,
  })?;

  let descriptor = Descriptor::parse(&text, config).map_err(|e| in_file(&canonical, e))?;
  let mut store = descriptor
    .to_store(Some(extract_comment(&text)), config)
    .map_err(|e| in_file(&canonical, e.into()))?;

  if descriptor.includes.is_empty() {
    return Ok(store);
  }

  let base = canonical.parent().map(Path::to_path_buf).unwrap_or_default();
  stack.push(canonical.clone());
  for include in &descriptor.includes {
    let target = base.join(include);
    debug!(from = %canonical.display(), include = %target.display(), "following include");
    let included = load_recursive(&target, config, stack)?;
    store = store.union(&included).map_err(|e| in_file(&canonical, e.into()))?;
  }
  stack.pop();

  Ok(store)
}

fn in_file(path: &Path, err: DescriptorError) -> DescriptorError {
  match err {
    // Already located.
    DescriptorError::InFile { .. } | DescriptorError::Read { .. } | DescriptorError::IncludeCycle(_) => err,
    other => DescriptorError::InFile {
      path: path.to_path_buf(),
      source: Box::new(other),
    },
  }
}
