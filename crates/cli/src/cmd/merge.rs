//! Merge command implementation.
//!
//! Loads descriptors, unions them and prints the canonical descriptor.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use isodep_lib::config::EngineConfig;
use isodep_lib::descriptor::load_files;
use isodep_lib::pretty::pretty_print_with_comment;
use isodep_lib::reduce::canonicalize;

use crate::output::print_success;

pub fn cmd_merge(files: &[PathBuf], platforms: &[String], write: Option<&Path>, config: &EngineConfig) -> Result<()> {
  let config = config.clone().with_platforms(platforms.iter().cloned());

  let store = load_files(files, &config).context("Failed to load descriptors")?;
  let canonical = canonicalize(&store).context("Failed to reduce merged descriptors")?;
  info!(files = files.len(), clauses = canonical.conditions.len(), "merged descriptors");

  let mut buf = Vec::new();
  pretty_print_with_comment(&canonical, store.file_comment(), &config, &mut buf)?;

  match write {
    Some(path) => {
      fs::write(path, &buf).with_context(|| format!("Failed to write {}", path.display()))?;
      print_success(&format!("Wrote {}", path.display()));
    }
    None => io::stdout().lock().write_all(&buf)?,
  }

  Ok(())
}
