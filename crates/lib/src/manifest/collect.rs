//! Turning resolved variables into an [`IsolatedFile`].

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::UNIX_EPOCH;

use tracing::{debug, info};

use super::types::{FileMeta, IsolatedFile, ManifestError};
use crate::util::hash::{hash_file, walk_files};
use crate::variables::VariableSet;

/// How much metadata to record for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detail {
  /// Mode, hash, size and modification time.
  Full,
  /// Size only, for files whose content does not matter.
  SizeOnly,
}

/// Source of file metadata.
pub trait FileCollector {
  /// Metadata for `relative` under `root`.
  ///
  /// A `relative` ending in `/` is a directory and expands to every file
  /// below it. Returned paths are relative to `root` and use `/`.
  fn collect(&self, root: &Path, relative: &str, detail: Detail) -> Result<Vec<(String, FileMeta)>, ManifestError>;
}

/// [`FileCollector`] reading the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsCollector;

impl FileCollector for FsCollector {
  fn collect(&self, root: &Path, relative: &str, detail: Detail) -> Result<Vec<(String, FileMeta)>, ManifestError> {
    let target = root.join(relative);

    if relative.ends_with('/') {
      let mut out = Vec::new();
      for path in walk_files(&target)? {
        let rel = path.strip_prefix(root).unwrap_or(&path);
        out.push((to_slash(rel), file_meta(&path, detail)?));
      }
      debug!(dir = relative, files = out.len(), "expanded directory");
      return Ok(out);
    }

    Ok(vec![(relative.to_string(), file_meta(&target, detail)?)])
  }
}

fn file_meta(path: &Path, detail: Detail) -> Result<FileMeta, ManifestError> {
  let metadata = fs::metadata(path).map_err(|source| ManifestError::Read {
    path: path.to_path_buf(),
    source,
  })?;

  if detail == Detail::SizeOnly {
    return Ok(FileMeta {
      size: Some(metadata.len()),
      ..Default::default()
    });
  }

  let mtime = metadata
    .modified()
    .ok()
    .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
    .and_then(|d| i64::try_from(d.as_secs()).ok());

  Ok(FileMeta {
    mode: mode_of(&metadata),
    hash: Some(hash_file(path)?.0),
    size: Some(metadata.len()),
    mtime,
  })
}

#[cfg(unix)]
fn mode_of(metadata: &fs::Metadata) -> Option<u32> {
  use std::os::unix::fs::PermissionsExt;
  Some(metadata.permissions().mode() & 0o7777)
}

#[cfg(not(unix))]
fn mode_of(_metadata: &fs::Metadata) -> Option<u32> {
  None
}

fn to_slash(path: &Path) -> String {
  path
    .components()
    .map(|c| c.as_os_str().to_string_lossy())
    .collect::<Vec<_>>()
    .join("/")
}

/// Build the `.isolated` record for one platform.
///
/// Tracked and untracked entries get full metadata; touched entries record
/// their size only. A file reached twice keeps its first, fuller record.
pub fn build_isolated<C: FileCollector>(
  vars: &VariableSet,
  platform: &str,
  root: &Path,
  collector: &C,
) -> Result<IsolatedFile, ManifestError> {
  let mut files = BTreeMap::new();

  for entry in vars.infiles() {
    for (path, meta) in collector.collect(root, &entry, Detail::Full)? {
      files.entry(path).or_insert(meta);
    }
  }
  for entry in &vars.touched {
    for (path, meta) in collector.collect(root, entry, Detail::SizeOnly)? {
      files.entry(path).or_insert(meta);
    }
  }

  info!(platform, files = files.len(), "built isolated manifest");

  Ok(IsolatedFile {
    command: vars.command.clone(),
    files,
    os: platform.to_string(),
    relative_cwd: vars.relative_cwd.clone(),
    read_only: vars.read_only,
  })
}
