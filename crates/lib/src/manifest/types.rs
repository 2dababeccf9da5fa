//! Persisted manifest records.
//!
//! Two records are written next to a resolved task:
//!
//! - [`IsolatedFile`]: the `.isolated` file read by the task runner. It holds
//!   the command, every mapped file with its metadata and the platform it was
//!   resolved for.
//! - [`SavedState`]: the `.state` file that remembers which descriptor and
//!   which variables produced the `.isolated` file.
//!
//! # Example
//!
//! ```json
//! {
//!   "command": ["python", "run.py"],
//!   "files": {
//!     "run.py": { "m": 488, "h": "9f86d0...", "s": 538, "t": 1335146921 },
//!     "lock": { "s": 0 }
//!   },
//!   "os": "linux",
//!   "relative_cwd": "tests",
//!   "read_only": 1
//! }
//! ```
//!
//! Loading is strict: a key outside the record's whitelist fails the load
//! and is never dropped.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::util::hash::HashError;
use crate::variables::ReadOnly;

/// Errors raised while loading, saving or building manifests.
#[derive(Debug, Error)]
pub enum ManifestError {
  #[error("found unexpected entries {keys:?} while constructing an object {type_name}")]
  SchemaViolation { type_name: &'static str, keys: Vec<String> },

  #[error("invalid {type_name}: {message}")]
  InvalidField { type_name: &'static str, message: String },

  #[error("failed to read {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to write {path}: {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("failed to serialize manifest: {0}")]
  Serialize(#[source] serde_json::Error),

  #[error(transparent)]
  Hash(#[from] HashError),
}

/// Metadata of one mapped file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileMeta {
  /// Unix permission bits.
  #[serde(rename = "m", default, skip_serializing_if = "Option::is_none")]
  pub mode: Option<u32>,

  /// SHA-256 of the content, lowercase hex.
  #[serde(rename = "h", default, skip_serializing_if = "Option::is_none")]
  pub hash: Option<String>,

  #[serde(rename = "s", default, skip_serializing_if = "Option::is_none")]
  pub size: Option<u64>,

  /// Modification time, seconds since the Unix epoch.
  #[serde(rename = "t", default, skip_serializing_if = "Option::is_none")]
  pub mtime: Option<i64>,
}

/// The `.isolated` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IsolatedFile {
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub command: Vec<String>,

  /// Relative path to metadata.
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub files: BTreeMap<String, FileMeta>,

  /// Platform flavor the record was resolved for.
  #[serde(default = "crate::platform::flavor")]
  pub os: String,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub relative_cwd: Option<String>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub read_only: Option<ReadOnly>,
}

impl Default for IsolatedFile {
  fn default() -> Self {
    Self {
      command: Vec::new(),
      files: BTreeMap::new(),
      os: crate::platform::flavor(),
      relative_cwd: None,
      read_only: None,
    }
  }
}

/// A value bound to a variable while resolving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariableValue {
  Int(i64),
  Str(String),
}

impl std::fmt::Display for VariableValue {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Int(n) => write!(f, "{n}"),
      Self::Str(s) => f.write_str(s),
    }
  }
}

impl From<&str> for VariableValue {
  /// Integers stay integers, anything else is a string.
  fn from(value: &str) -> Self {
    value.parse().map(Self::Int).unwrap_or_else(|_| Self::Str(value.to_string()))
  }
}

/// The `.state` record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SavedState {
  /// Descriptor the state was produced from.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub isolate_file: Option<String>,

  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub variables: BTreeMap<String, VariableValue>,
}

/// A manifest record with a fixed key whitelist, stored as JSON.
pub trait Record: Serialize + DeserializeOwned {
  /// Name used in validation errors.
  const TYPE_NAME: &'static str;

  /// Every key the record accepts.
  const KEYS: &'static [&'static str];

  /// Build the record from an untyped mapping.
  ///
  /// Keys outside [`Record::KEYS`] fail with
  /// [`ManifestError::SchemaViolation`] naming all of them. Absent keys take
  /// their defaults.
  fn load(value: &Value) -> Result<Self, ManifestError> {
    let map = value.as_object().ok_or_else(|| ManifestError::InvalidField {
      type_name: Self::TYPE_NAME,
      message: format!("expected a mapping, got {value}"),
    })?;

    let unexpected: Vec<String> = map
      .keys()
      .filter(|key| !Self::KEYS.contains(&key.as_str()))
      .cloned()
      .collect();
    if !unexpected.is_empty() {
      return Err(ManifestError::SchemaViolation {
        type_name: Self::TYPE_NAME,
        keys: unexpected,
      });
    }

    serde_json::from_value(value.clone()).map_err(|e| ManifestError::InvalidField {
      type_name: Self::TYPE_NAME,
      message: e.to_string(),
    })
  }

  /// The untyped mapping to persist. Unset and empty fields are omitted.
  fn flatten(&self) -> Result<Value, ManifestError> {
    serde_json::to_value(self).map_err(ManifestError::Serialize)
  }

  /// Read and [`Record::load`] a JSON file.
  fn read(path: &Path) -> Result<Self, ManifestError> {
    let content = fs::read_to_string(path).map_err(|source| ManifestError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    let value: Value = serde_json::from_str(&content).map_err(|source| ManifestError::Parse {
      path: path.to_path_buf(),
      source,
    })?;
    Self::load(&value)
  }

  /// Write the record as pretty-printed JSON.
  fn write(&self, path: &Path) -> Result<(), ManifestError> {
    let content = serde_json::to_string_pretty(&self.flatten()?).map_err(ManifestError::Serialize)?;
    fs::write(path, content + "\n").map_err(|source| ManifestError::Write {
      path: path.to_path_buf(),
      source,
    })
  }
}

impl Record for IsolatedFile {
  const TYPE_NAME: &'static str = "IsolatedFile";
  const KEYS: &'static [&'static str] = &["command", "files", "os", "relative_cwd", "read_only"];
}

impl Record for SavedState {
  const TYPE_NAME: &'static str = "SavedState";
  const KEYS: &'static [&'static str] = &["isolate_file", "variables"];
}
