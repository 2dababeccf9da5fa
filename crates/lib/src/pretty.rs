//! Canonical descriptor text.
//!
//! Output is deterministic: clauses are sorted by label set, path lists are
//! sorted, `command` keeps its argv order. Parsing the output gives back an
//! equal [`Descriptor`] up to that ordering.

use std::fmt::Write as _;
use std::io;

use crate::config::EngineConfig;
use crate::consts::{KEY_COMMAND, KEY_CONDITIONS, KEY_INCLUDES, KEY_READ_ONLY, KEY_RELATIVE_CWD, KEY_VARIABLES};
use crate::descriptor::{Clause, Descriptor};
use crate::variables::{Category, VariableSet};

const INDENT: &str = "  ";

/// Write the canonical text of `descriptor` to `out`.
pub fn pretty_print<W: io::Write>(descriptor: &Descriptor, config: &EngineConfig, out: &mut W) -> io::Result<()> {
  out.write_all(to_pretty_string(descriptor, config).as_bytes())
}

/// Like [`pretty_print`], with `comment` written first.
pub fn pretty_print_with_comment<W: io::Write>(
  descriptor: &Descriptor,
  comment: Option<&str>,
  config: &EngineConfig,
  out: &mut W,
) -> io::Result<()> {
  if let Some(comment) = comment {
    out.write_all(comment.as_bytes())?;
  }
  pretty_print(descriptor, config, out)
}

/// The canonical text of `descriptor`.
pub fn to_pretty_string(descriptor: &Descriptor, config: &EngineConfig) -> String {
  let mut out = String::from("{\n");

  if !descriptor.includes.is_empty() {
    let mut includes: Vec<&String> = descriptor.includes.iter().collect();
    includes.sort();
    write_list(&mut out, 1, KEY_INCLUDES, includes);
  }

  if !descriptor.variables.is_empty() {
    write_variables(&mut out, 1, &descriptor.variables);
  }

  if !descriptor.conditions.is_empty() {
    let mut clauses: Vec<&Clause> = descriptor.conditions.iter().collect();
    clauses.sort_by(|a, b| a.condition.cmp(&b.condition));

    line(&mut out, 1, &format!("{}: [", quote(KEY_CONDITIONS)));
    for clause in clauses {
      line(&mut out, 2, &format!("[{}, {{", quote(&clause.condition.render(&config.variable))));
      write_variables(&mut out, 3, &clause.then);
      if let Some(otherwise) = &clause.otherwise {
        line(&mut out, 2, "}, {");
        write_variables(&mut out, 3, otherwise);
      }
      line(&mut out, 2, "}],");
    }
    line(&mut out, 1, "],");
  }

  out.push_str("}\n");
  out
}

fn write_variables(out: &mut String, depth: usize, vars: &VariableSet) {
  line(out, depth, &format!("{}: {{", quote(KEY_VARIABLES)));
  let inner = depth + 1;

  if !vars.command.is_empty() {
    write_list(out, inner, KEY_COMMAND, vars.command.iter().collect());
  }
  if let Some(cwd) = &vars.relative_cwd {
    line(out, inner, &format!("{}: {},", quote(KEY_RELATIVE_CWD), quote(cwd)));
  }
  if let Some(mode) = vars.read_only {
    line(out, inner, &format!("{}: {mode},", quote(KEY_READ_ONLY)));
  }
  for category in Category::PATHS {
    let mut paths: Vec<&String> = vars.paths(category).iter().collect();
    if paths.is_empty() {
      continue;
    }
    paths.sort();
    write_list(out, inner, category.key(), paths);
  }

  line(out, depth, "},");
}

fn write_list(out: &mut String, depth: usize, key: &str, items: Vec<&String>) {
  line(out, depth, &format!("{}: [", quote(key)));
  for item in items {
    line(out, depth + 1, &format!("{},", quote(item)));
  }
  line(out, depth, "],");
}

fn line(out: &mut String, depth: usize, text: &str) {
  let _ = writeln!(out, "{}{text}", INDENT.repeat(depth));
}

/// Single-quoted literal with backslash escapes.
fn quote(value: &str) -> String {
  let mut quoted = String::with_capacity(value.len() + 2);
  quoted.push('\'');
  for ch in value.chars() {
    match ch {
      '\\' => quoted.push_str("\\\\"),
      '\'' => quoted.push_str("\\'"),
      '\n' => quoted.push_str("\\n"),
      '\t' => quoted.push_str("\\t"),
      '\r' => quoted.push_str("\\r"),
      c => quoted.push(c),
    }
  }
  quoted.push('\'');
  quoted
}
