//! Condition expressions.
//!
//! A condition selects a set of platforms by equality on one variable:
//!
//! - `OS=="linux"`
//! - `OS=="linux" or OS=="mac"`
//!
//! Nothing else is accepted. The variable name comes from
//! [`EngineConfig::variable`](crate::config::EngineConfig).

use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

/// A condition expression outside the supported grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported condition '{expr}': {reason}")]
pub struct ConditionError {
  pub expr: String,
  pub reason: String,
}

/// A parsed condition: true when the variable equals one of `platforms`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Expr {
  pub platforms: BTreeSet<String>,
}

impl Expr {
  pub fn new<I, S>(platforms: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      platforms: platforms.into_iter().map(Into::into).collect(),
    }
  }

  /// True when `platform` satisfies the expression.
  pub fn matches(&self, platform: &str) -> bool {
    self.platforms.contains(platform)
  }

  /// Canonical text, labels in sorted order.
  pub fn render(&self, variable: &str) -> String {
    self
      .platforms
      .iter()
      .map(|p| format!("{variable}==\"{p}\""))
      .collect::<Vec<_>>()
      .join(" or ")
  }

  /// Parse an expression testing `variable`.
  ///
  /// # Errors
  ///
  /// Returns [`ConditionError`] with the offending text for anything other
  /// than equality tests on `variable` joined by `or`.
  pub fn parse(text: &str, variable: &str) -> Result<Expr, ConditionError> {
    let fail = |reason: String| ConditionError {
      expr: text.to_string(),
      reason,
    };

    let mut scanner = Scanner::new(text);
    let mut platforms = BTreeSet::new();

    loop {
      let name = scanner.identifier().ok_or_else(|| fail(format!("expected '{variable}'")))?;
      if name != variable {
        return Err(fail(format!("unknown name '{name}', only '{variable}' can be tested")));
      }
      if !scanner.literal("==") {
        return Err(fail("expected '=='".to_string()));
      }
      let label = scanner.quoted().ok_or_else(|| fail("expected a quoted platform label".to_string()))?;
      if label.is_empty() {
        return Err(fail("empty platform label".to_string()));
      }
      platforms.insert(label);

      if scanner.at_end() {
        break;
      }
      match scanner.identifier() {
        Some(word) if word == "or" => continue,
        Some(word) => return Err(fail(format!("unsupported operator '{word}'"))),
        None => return Err(fail("unexpected trailing input".to_string())),
      }
    }

    Ok(Expr { platforms })
  }
}

impl fmt::Display for Expr {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let labels: Vec<_> = self.platforms.iter().map(String::as_str).collect();
    write!(f, "{{{}}}", labels.join(", "))
  }
}

struct Scanner<'a> {
  rest: &'a str,
}

impl<'a> Scanner<'a> {
  fn new(text: &'a str) -> Self {
    Self { rest: text }
  }

  fn skip_ws(&mut self) {
    self.rest = self.rest.trim_start();
  }

  fn at_end(&mut self) -> bool {
    self.skip_ws();
    self.rest.is_empty()
  }

  fn identifier(&mut self) -> Option<String> {
    self.skip_ws();
    let end = self
      .rest
      .char_indices()
      .find(|(_, c)| !(c.is_alphanumeric() || *c == '_'))
      .map(|(i, _)| i)
      .unwrap_or(self.rest.len());
    if end == 0 {
      return None;
    }
    let (ident, rest) = self.rest.split_at(end);
    self.rest = rest;
    Some(ident.to_string())
  }

  fn literal(&mut self, token: &str) -> bool {
    self.skip_ws();
    match self.rest.strip_prefix(token) {
      Some(rest) => {
        self.rest = rest;
        true
      }
      None => false,
    }
  }

  fn quoted(&mut self) -> Option<String> {
    self.skip_ws();
    let quote = self.rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let body = &self.rest[1..];
    let end = body.find(quote)?;
    let label = body[..end].to_string();
    self.rest = &body[end + 1..];
    Some(label)
  }
}
