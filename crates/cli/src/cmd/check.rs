//! Check command implementation.
//!
//! Validates a `.isolated` or `.state` file against its key whitelist.

use std::path::Path;

use anyhow::Result;
use clap::ValueEnum;

use isodep_lib::manifest::{IsolatedFile, Record, SavedState};

use crate::output::{OutputFormat, print_error, print_json, print_stat, print_success, symbols, truncate_hash};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ManifestKind {
  Isolated,
  State,
}

pub fn cmd_check(file: &Path, kind: ManifestKind, verbose: bool, output: OutputFormat) -> Result<()> {
  match kind {
    ManifestKind::Isolated => {
      let isolated = read_or_report::<IsolatedFile>(file)?;
      if output.is_json() {
        return print_json(&isolated.flatten()?);
      }
      print_success(&format!("{} is a valid {}", file.display(), IsolatedFile::TYPE_NAME));
      print_stat("Platform", &isolated.os);
      print_stat("Files", &isolated.files.len().to_string());
      if !isolated.command.is_empty() {
        print_stat("Command", &isolated.command.join(" "));
      }
      if verbose && !isolated.files.is_empty() {
        println!();
        println!("Files:");
        for (path, meta) in &isolated.files {
          match &meta.hash {
            Some(hash) => println!("  {} {} {}", symbols::INFO, path, truncate_hash(hash)),
            None => println!("  {} {}", symbols::INFO, path),
          }
        }
      }
    }
    ManifestKind::State => {
      let state = read_or_report::<SavedState>(file)?;
      if output.is_json() {
        return print_json(&state.flatten()?);
      }
      print_success(&format!("{} is a valid {}", file.display(), SavedState::TYPE_NAME));
      if let Some(isolate_file) = &state.isolate_file {
        print_stat("Descriptor", isolate_file);
      }
      for (name, value) in &state.variables {
        print_stat(name, &value.to_string());
      }
    }
  }

  Ok(())
}

fn read_or_report<R: Record>(file: &Path) -> Result<R> {
  R::read(file).map_err(|e| {
    print_error(&format!("{} is not a valid {}: {}", file.display(), R::TYPE_NAME, e));
    e.into()
  })
}
