//! Restricted literal parser for descriptor text.
//!
//! Descriptors are written as nested literals:
//!
//! ```text
//! # Leading comments are allowed.
//! {
//!   'variables': {
//!     'command': ['python', 'run.py'],
//!   },
//!   'conditions': [
//!     ['OS=="linux"', {
//!       'variables': {
//!         'read_only': True,
//!       },
//!     }],
//!   ],
//! }
//! ```
//!
//! The grammar is data only: mappings, lists, quoted strings, integers and
//! the three names `True`, `False` and `None`. Any other bare name fails the
//! parse, so nothing in a descriptor can reach host functionality.
//!
//! # Example
//!
//! ```
//! use isodep_lib::descriptor::literal::parse;
//! use serde_json::json;
//!
//! let value = parse("{'a': [1, True, None],}").unwrap();
//! assert_eq!(value, json!({ "a": [1, true, null] }));
//! ```

use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Errors raised while parsing descriptor text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiteralError {
  #[error("unexpected end of input")]
  UnexpectedEof,

  #[error("unexpected character '{ch}' at position {pos}")]
  Unexpected { ch: char, pos: usize },

  #[error("unterminated string starting at position {0}")]
  UnterminatedString(usize),

  #[error("name '{name}' is not defined (position {pos})")]
  UndefinedName { name: String, pos: usize },

  #[error("mapping key at position {0} must be a string")]
  NonStringKey(usize),

  #[error("duplicate mapping key '{key}' at position {pos}")]
  DuplicateKey { key: String, pos: usize },

  #[error("invalid number '{0}'")]
  InvalidNumber(String),
}

/// Parse a descriptor literal into an untyped value.
///
/// # Errors
///
/// Returns an error for malformed syntax, undefined names, non-string
/// mapping keys, duplicate keys and trailing content.
pub fn parse(input: &str) -> Result<Value, LiteralError> {
  let mut parser = Parser::new(input);
  let value = parser.value()?;
  parser.skip_trivia();
  match parser.peek() {
    None => Ok(value),
    Some((pos, ch)) => Err(LiteralError::Unexpected { ch, pos }),
  }
}

struct Parser {
  chars: Vec<(usize, char)>,
  index: usize,
}

impl Parser {
  fn new(input: &str) -> Self {
    Self {
      chars: input.char_indices().collect(),
      index: 0,
    }
  }

  fn peek(&self) -> Option<(usize, char)> {
    self.chars.get(self.index).copied()
  }

  fn bump(&mut self) -> Option<(usize, char)> {
    let next = self.peek();
    if next.is_some() {
      self.index += 1;
    }
    next
  }

  /// Skip whitespace and `#` comments.
  fn skip_trivia(&mut self) {
    while let Some((_, ch)) = self.peek() {
      if ch.is_whitespace() {
        self.index += 1;
      } else if ch == '#' {
        while let Some((_, c)) = self.bump() {
          if c == '\n' {
            break;
          }
        }
      } else {
        break;
      }
    }
  }

  fn expect(&mut self, expected: char) -> Result<(), LiteralError> {
    self.skip_trivia();
    match self.bump() {
      Some((_, ch)) if ch == expected => Ok(()),
      Some((pos, ch)) => Err(LiteralError::Unexpected { ch, pos }),
      None => Err(LiteralError::UnexpectedEof),
    }
  }

  fn value(&mut self) -> Result<Value, LiteralError> {
    self.skip_trivia();
    let (pos, ch) = self.peek().ok_or(LiteralError::UnexpectedEof)?;
    match ch {
      '{' => self.mapping(),
      '[' => self.list(),
      '\'' | '"' => self.string().map(Value::String),
      '-' | '0'..='9' => self.number(),
      c if c.is_alphabetic() || c == '_' => self.name(),
      _ => Err(LiteralError::Unexpected { ch, pos }),
    }
  }

  fn mapping(&mut self) -> Result<Value, LiteralError> {
    self.expect('{')?;
    let mut map = Map::new();

    loop {
      self.skip_trivia();
      match self.peek() {
        None => return Err(LiteralError::UnexpectedEof),
        Some((_, '}')) => {
          self.index += 1;
          return Ok(Value::Object(map));
        }
        Some((pos, _)) => {
          let key = match self.value()? {
            Value::String(key) => key,
            _ => return Err(LiteralError::NonStringKey(pos)),
          };
          self.expect(':')?;
          let value = self.value()?;
          if map.contains_key(&key) {
            return Err(LiteralError::DuplicateKey { key, pos });
          }
          map.insert(key, value);
        }
      }

      if !self.separator('}')? {
        self.expect('}')?;
        return Ok(Value::Object(map));
      }
    }
  }

  fn list(&mut self) -> Result<Value, LiteralError> {
    self.expect('[')?;
    let mut items = Vec::new();

    loop {
      self.skip_trivia();
      match self.peek() {
        None => return Err(LiteralError::UnexpectedEof),
        Some((_, ']')) => {
          self.index += 1;
          return Ok(Value::Array(items));
        }
        Some(_) => items.push(self.value()?),
      }

      if !self.separator(']')? {
        self.expect(']')?;
        return Ok(Value::Array(items));
      }
    }
  }

  /// Consume a `,` between items. Returns false when the container closes
  /// without one.
  fn separator(&mut self, close: char) -> Result<bool, LiteralError> {
    self.skip_trivia();
    match self.peek() {
      Some((_, ',')) => {
        self.index += 1;
        Ok(true)
      }
      Some((_, ch)) if ch == close => Ok(false),
      Some((pos, ch)) => Err(LiteralError::Unexpected { ch, pos }),
      None => Err(LiteralError::UnexpectedEof),
    }
  }

  fn string(&mut self) -> Result<String, LiteralError> {
    let (start, quote) = self.bump().ok_or(LiteralError::UnexpectedEof)?;
    let mut out = String::new();

    loop {
      let (_, ch) = self.bump().ok_or(LiteralError::UnterminatedString(start))?;
      if ch == quote {
        return Ok(out);
      }
      if ch == '\n' {
        return Err(LiteralError::UnterminatedString(start));
      }
      if ch != '\\' {
        out.push(ch);
        continue;
      }

      let (_, escaped) = self.bump().ok_or(LiteralError::UnterminatedString(start))?;
      match escaped {
        '\\' => out.push('\\'),
        '\'' => out.push('\''),
        '"' => out.push('"'),
        'n' => out.push('\n'),
        't' => out.push('\t'),
        'r' => out.push('\r'),
        // Unknown escapes are kept as written.
        other => {
          out.push('\\');
          out.push(other);
        }
      }
    }
  }

  fn number(&mut self) -> Result<Value, LiteralError> {
    let mut text = String::new();
    if let Some((_, '-')) = self.peek() {
      text.push('-');
      self.index += 1;
    }
    while let Some((_, ch)) = self.peek() {
      if !ch.is_ascii_digit() {
        break;
      }
      text.push(ch);
      self.index += 1;
    }

    text
      .parse::<i64>()
      .map(|n| Value::Number(Number::from(n)))
      .map_err(|_| LiteralError::InvalidNumber(text))
  }

  fn name(&mut self) -> Result<Value, LiteralError> {
    let pos = self.peek().map(|(pos, _)| pos).unwrap_or_default();
    let mut name = String::new();
    while let Some((_, ch)) = self.peek() {
      if !(ch.is_alphanumeric() || ch == '_') {
        break;
      }
      name.push(ch);
      self.index += 1;
    }

    match name.as_str() {
      "True" => Ok(Value::Bool(true)),
      "False" => Ok(Value::Bool(false)),
      "None" => Ok(Value::Null),
      _ => Err(LiteralError::UndefinedName { name, pos }),
    }
  }
}
