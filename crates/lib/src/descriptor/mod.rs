//! Descriptor files.
//!
//! A descriptor declares the variables of a task, unconditionally and per
//! platform condition. It is the text form of a [`ConfigStore`]:
//!
//! ```text
//! {
//!   'includes': ['../common.isolate'],
//!   'variables': { ... },
//!   'conditions': [
//!     ['OS=="linux"', { 'variables': { ... } }, { 'variables': { ... } }],
//!   ],
//! }
//! ```
//!
//! Parsing is strict: unknown root keys, unknown block keys and unknown
//! variable keys are errors.

pub mod condition;
pub mod literal;
mod load;

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

use crate::config::EngineConfig;
use crate::consts::{KEY_CONDITIONS, KEY_INCLUDES, KEY_VARIABLES};
use crate::store::{ConfigStore, StoreError};
use crate::variables::{VariableSet, VariablesError};

pub use condition::{ConditionError, Expr};
pub use literal::LiteralError;
pub use load::{load_file, load_files};

/// Errors raised while reading descriptors.
#[derive(Debug, Error)]
pub enum DescriptorError {
  #[error("syntax error: {0}")]
  Syntax(#[from] LiteralError),

  #[error(transparent)]
  Condition(#[from] ConditionError),

  #[error("invalid variables: {0}")]
  Variables(#[from] VariablesError),

  #[error(transparent)]
  Store(#[from] StoreError),

  #[error("descriptor root must be a mapping")]
  NotAMapping,

  #[error("unknown descriptor key '{0}'")]
  UnknownRootKey(String),

  #[error("malformed condition #{index}: {reason}")]
  MalformedCondition { index: usize, reason: String },

  #[error("'includes' must be a list of strings")]
  InvalidIncludes,

  #[error("include cycle through {0}")]
  IncludeCycle(PathBuf),

  #[error("failed to read descriptor {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("{path}: {source}")]
  InFile {
    path: PathBuf,
    #[source]
    source: Box<DescriptorError>,
  },
}

/// One entry of `conditions`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
  pub condition: Expr,
  /// Variables for the platforms the condition names.
  pub then: VariableSet,
  /// Variables for every other platform.
  pub otherwise: Option<VariableSet>,
}

/// A parsed descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Descriptor {
  pub includes: Vec<String>,
  pub variables: VariableSet,
  pub conditions: Vec<Clause>,
}

impl Descriptor {
  /// Parse descriptor text.
  pub fn parse(text: &str, config: &EngineConfig) -> Result<Descriptor, DescriptorError> {
    let value = literal::parse(text)?;
    Self::from_value(&value, config)
  }

  /// Build a descriptor from an untyped mapping.
  pub fn from_value(value: &Value, config: &EngineConfig) -> Result<Descriptor, DescriptorError> {
    let root = value.as_object().ok_or(DescriptorError::NotAMapping)?;
    let mut descriptor = Descriptor::default();

    for (key, item) in root {
      match key.as_str() {
        KEY_VARIABLES => descriptor.variables = VariableSet::from_value(item)?,
        KEY_CONDITIONS => {
          let clauses = item.as_array().ok_or_else(|| DescriptorError::MalformedCondition {
            index: 0,
            reason: "'conditions' must be a list".to_string(),
          })?;
          for (index, clause) in clauses.iter().enumerate() {
            descriptor.conditions.push(parse_clause(index, clause, config)?);
          }
        }
        KEY_INCLUDES => {
          let includes = item.as_array().ok_or(DescriptorError::InvalidIncludes)?;
          descriptor.includes = includes
            .iter()
            .map(|i| i.as_str().map(str::to_string).ok_or(DescriptorError::InvalidIncludes))
            .collect::<Result<_, _>>()?;
        }
        other => return Err(DescriptorError::UnknownRootKey(other.to_string())),
      }
    }

    Ok(descriptor)
  }

  /// True when the descriptor declares nothing.
  pub fn is_empty(&self) -> bool {
    self.includes.is_empty() && self.variables.is_empty() && self.conditions.is_empty()
  }

  /// Every platform label named by a condition.
  pub fn platforms(&self) -> BTreeSet<String> {
    self
      .conditions
      .iter()
      .flat_map(|clause| clause.condition.platforms.iter().cloned())
      .collect()
  }

  /// Materialize the descriptor as a store.
  ///
  /// `includes` are not followed here; see [`load_file`].
  pub fn to_store(&self, file_comment: Option<String>, config: &EngineConfig) -> Result<ConfigStore, StoreError> {
    let mut platforms = self.platforms();
    platforms.extend(config.platforms.iter().cloned());

    let mut store = ConfigStore::new(platforms, file_comment);
    store.add_globals(&self.variables)?;
    for clause in &self.conditions {
      store.add_values(&clause.condition.platforms, &clause.then)?;
      if let Some(otherwise) = &clause.otherwise {
        store.add_negative_values(&clause.condition.platforms, otherwise)?;
      }
    }
    Ok(store)
  }

  /// [`Descriptor::to_store`] without a file comment.
  pub fn into_store(self, config: &EngineConfig) -> Result<ConfigStore, StoreError> {
    self.to_store(None, config)
  }
}

fn parse_clause(index: usize, value: &Value, config: &EngineConfig) -> Result<Clause, DescriptorError> {
  let malformed = |reason: &str| DescriptorError::MalformedCondition {
    index,
    reason: reason.to_string(),
  };

  let items = value
    .as_array()
    .ok_or_else(|| malformed("expected [expression, then] or [expression, then, else]"))?;
  if !(2..=3).contains(&items.len()) {
    return Err(malformed(&format!("expected 2 or 3 elements, got {}", items.len())));
  }

  let text = items[0].as_str().ok_or_else(|| malformed("expression must be a string"))?;
  let condition = Expr::parse(text, &config.variable)?;
  let then = parse_block(index, &items[1])?;
  let otherwise = items.get(2).map(|block| parse_block(index, block)).transpose()?;

  Ok(Clause {
    condition,
    then,
    otherwise,
  })
}

fn parse_block(index: usize, value: &Value) -> Result<VariableSet, DescriptorError> {
  let block = value.as_object().ok_or_else(|| DescriptorError::MalformedCondition {
    index,
    reason: "branch must be a mapping".to_string(),
  })?;

  let mut vars = VariableSet::new();
  for (key, item) in block {
    if key != KEY_VARIABLES {
      return Err(DescriptorError::MalformedCondition {
        index,
        reason: format!("unknown branch key '{key}'"),
      });
    }
    vars = VariableSet::from_value(item)?;
  }
  Ok(vars)
}

/// The leading run of `#` lines of a descriptor, each with its newline.
pub fn extract_comment(text: &str) -> String {
  text
    .split_inclusive('\n')
    .take_while(|line| line.starts_with('#'))
    .map(|line| if line.ends_with('\n') { line.to_string() } else { format!("{line}\n") })
    .collect()
}
