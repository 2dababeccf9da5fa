//! Per-platform dependency variables.
//!
//! A [`VariableSet`] is everything a task depends on for one platform bucket:
//! the command line, the relative working directory, the read-only mode and
//! three kinds of path dependencies.
//!
//! # Path kinds
//!
//! Path lists are ordered by strength, strongest first:
//! - tracked: files whose content is part of the task identity
//! - untracked: files or directories (`dir/`) mapped in but not hashed
//! - touched: files that are only opened, their content is irrelevant

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::consts::{KEY_COMMAND, KEY_READ_ONLY, KEY_RELATIVE_CWD, KEY_TOUCHED, KEY_TRACKED, KEY_UNTRACKED};

/// Read-only mode applied to the mapped files, ordered by strictness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ReadOnly {
  /// Files stay writable.
  Writable = 0,
  /// Write permission is stripped from files, except declared outputs.
  Files = 1,
  /// Write permission is stripped from files and directories.
  Tree = 2,
}

impl ReadOnly {
  /// The stricter of two modes.
  pub fn strictest(self, other: Self) -> Self {
    self.max(other)
  }
}

impl From<ReadOnly> for u8 {
  fn from(value: ReadOnly) -> Self {
    value as u8
  }
}

impl TryFrom<u8> for ReadOnly {
  type Error = String;

  fn try_from(value: u8) -> Result<Self, Self::Error> {
    match value {
      0 => Ok(Self::Writable),
      1 => Ok(Self::Files),
      2 => Ok(Self::Tree),
      other => Err(format!("read_only must be 0, 1 or 2, got {other}")),
    }
  }
}

impl fmt::Display for ReadOnly {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", *self as u8)
  }
}

/// One field of a [`VariableSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
  Command,
  RelativeCwd,
  ReadOnly,
  Tracked,
  Untracked,
  Touched,
}

impl Category {
  /// Path categories, strongest first.
  pub const PATHS: [Category; 3] = [Category::Tracked, Category::Untracked, Category::Touched];

  /// The descriptor key for this category.
  pub fn key(self) -> &'static str {
    match self {
      Self::Command => KEY_COMMAND,
      Self::RelativeCwd => KEY_RELATIVE_CWD,
      Self::ReadOnly => KEY_READ_ONLY,
      Self::Tracked => KEY_TRACKED,
      Self::Untracked => KEY_UNTRACKED,
      Self::Touched => KEY_TOUCHED,
    }
  }

  /// Look up a category by descriptor key.
  pub fn from_key(key: &str) -> Option<Self> {
    match key {
      KEY_COMMAND => Some(Self::Command),
      KEY_RELATIVE_CWD => Some(Self::RelativeCwd),
      KEY_READ_ONLY => Some(Self::ReadOnly),
      KEY_TRACKED => Some(Self::Tracked),
      KEY_UNTRACKED => Some(Self::Untracked),
      KEY_TOUCHED => Some(Self::Touched),
      _ => None,
    }
  }

  pub fn is_path(self) -> bool {
    matches!(self, Self::Tracked | Self::Untracked | Self::Touched)
  }
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.key())
  }
}

/// Errors raised while building a [`VariableSet`] from untyped data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VariablesError {
  #[error("unknown variable '{0}'")]
  UnknownKey(String),

  #[error("variables must be a mapping, got {0}")]
  NotAMapping(String),

  #[error("invalid value for '{key}': expected {expected}")]
  InvalidValue { key: String, expected: &'static str },

  #[error("duplicate entry '{entry}' in '{key}'")]
  DuplicateEntry { key: String, entry: String },
}

/// Two sets disagree on a scalar field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("conflicting {category}: {left} vs {right}")]
pub struct MergeConflict {
  pub category: Category,
  pub left: String,
  pub right: String,
}

/// Dependencies of a task for one platform bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableSet {
  /// Command line (argv). Empty means unset.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub command: Vec<String>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub relative_cwd: Option<String>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub read_only: Option<ReadOnly>,

  #[serde(default, rename = "isolate_dependency_tracked", skip_serializing_if = "Vec::is_empty")]
  pub tracked: Vec<String>,

  #[serde(default, rename = "isolate_dependency_untracked", skip_serializing_if = "Vec::is_empty")]
  pub untracked: Vec<String>,

  #[serde(default, rename = "isolate_dependency_touched", skip_serializing_if = "Vec::is_empty")]
  pub touched: Vec<String>,
}

impl VariableSet {
  pub fn new() -> Self {
    Self::default()
  }

  /// True when no field is set.
  pub fn is_empty(&self) -> bool {
    self.command.is_empty()
      && self.relative_cwd.is_none()
      && self.read_only.is_none()
      && self.tracked.is_empty()
      && self.untracked.is_empty()
      && self.touched.is_empty()
  }

  /// The path list of a path category. Scalar categories have no list.
  pub fn paths(&self, category: Category) -> &[String] {
    match category {
      Category::Tracked => &self.tracked,
      Category::Untracked => &self.untracked,
      Category::Touched => &self.touched,
      _ => &[],
    }
  }

  fn paths_mut(&mut self, category: Category) -> Option<&mut Vec<String>> {
    match category {
      Category::Tracked => Some(&mut self.tracked),
      Category::Untracked => Some(&mut self.untracked),
      Category::Touched => Some(&mut self.touched),
      _ => None,
    }
  }

  /// Append a path, rejecting duplicates within the same category.
  pub fn push_path(&mut self, category: Category, path: impl Into<String>) -> Result<(), VariablesError> {
    let path = path.into();
    let Some(list) = self.paths_mut(category) else {
      return Err(VariablesError::InvalidValue {
        key: category.key().to_string(),
        expected: "a path category",
      });
    };
    if list.contains(&path) {
      return Err(VariablesError::DuplicateEntry {
        key: category.key().to_string(),
        entry: path,
      });
    }
    list.push(path);
    Ok(())
  }

  /// Tracked entries followed by untracked entries.
  pub fn infiles(&self) -> Vec<String> {
    self.tracked.iter().chain(self.untracked.iter()).cloned().collect()
  }

  /// Merge two sets into a new one.
  ///
  /// Lists are concatenated, keeping the first occurrence of each entry.
  /// `command` and `relative_cwd` must be identical when both sides set
  /// them. `read_only` takes the strictest mode.
  pub fn merge(&self, other: &VariableSet) -> Result<VariableSet, MergeConflict> {
    let command = match (self.command.is_empty(), other.command.is_empty()) {
      (_, true) => self.command.clone(),
      (true, false) => other.command.clone(),
      (false, false) if self.command == other.command => self.command.clone(),
      (false, false) => {
        return Err(MergeConflict {
          category: Category::Command,
          left: format!("{:?}", self.command),
          right: format!("{:?}", other.command),
        });
      }
    };

    let relative_cwd = match (&self.relative_cwd, &other.relative_cwd) {
      (Some(left), Some(right)) if left != right => {
        return Err(MergeConflict {
          category: Category::RelativeCwd,
          left: left.clone(),
          right: right.clone(),
        });
      }
      (left, right) => left.clone().or_else(|| right.clone()),
    };

    let read_only = match (self.read_only, other.read_only) {
      (Some(left), Some(right)) => Some(left.strictest(right)),
      (left, right) => left.or(right),
    };

    Ok(VariableSet {
      command,
      relative_cwd,
      read_only,
      tracked: concat_unique(&self.tracked, &other.tracked),
      untracked: concat_unique(&self.untracked, &other.untracked),
      touched: concat_unique(&self.touched, &other.touched),
    })
  }

  /// Copy with every path list sorted.
  pub fn sorted(&self) -> VariableSet {
    let mut out = self.clone();
    out.tracked.sort();
    out.untracked.sort();
    out.touched.sort();
    out
  }

  /// Parse a `variables` block.
  ///
  /// Unknown keys are rejected, never dropped.
  pub fn from_value(value: &Value) -> Result<VariableSet, VariablesError> {
    let map = value
      .as_object()
      .ok_or_else(|| VariablesError::NotAMapping(value.to_string()))?;

    let mut vars = VariableSet::new();
    for (key, item) in map {
      let category = Category::from_key(key).ok_or_else(|| VariablesError::UnknownKey(key.clone()))?;
      match category {
        Category::Command => vars.command = string_list(key, item)?,
        Category::RelativeCwd => {
          vars.relative_cwd = match item {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            _ => return Err(invalid(key, "a string")),
          };
        }
        Category::ReadOnly => vars.read_only = read_only_value(key, item)?,
        path_category => {
          for path in string_list(key, item)? {
            vars.push_path(path_category, path)?;
          }
        }
      }
    }
    Ok(vars)
  }
}

fn concat_unique(left: &[String], right: &[String]) -> Vec<String> {
  let mut out = left.to_vec();
  for item in right {
    if !out.contains(item) {
      out.push(item.clone());
    }
  }
  out
}

fn invalid(key: &str, expected: &'static str) -> VariablesError {
  VariablesError::InvalidValue {
    key: key.to_string(),
    expected,
  }
}

fn string_list(key: &str, value: &Value) -> Result<Vec<String>, VariablesError> {
  let items = value.as_array().ok_or_else(|| invalid(key, "a list of strings"))?;
  items
    .iter()
    .map(|item| {
      item
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| invalid(key, "a list of strings"))
    })
    .collect()
}

fn read_only_value(key: &str, value: &Value) -> Result<Option<ReadOnly>, VariablesError> {
  match value {
    Value::Null => Ok(None),
    Value::Bool(false) => Ok(Some(ReadOnly::Writable)),
    Value::Bool(true) => Ok(Some(ReadOnly::Files)),
    Value::Number(n) => n
      .as_u64()
      .and_then(|n| u8::try_from(n).ok())
      .and_then(|n| ReadOnly::try_from(n).ok())
      .map(Some)
      .ok_or_else(|| invalid(key, "0, 1 or 2")),
    _ => Err(invalid(key, "0, 1 or 2")),
  }
}
