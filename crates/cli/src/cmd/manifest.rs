//! Manifest command implementation.
//!
//! Resolves a descriptor for one platform and records the mapped files in an
//! `.isolated` manifest, optionally along with a `.state` record.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde_json::json;

use isodep_lib::config::EngineConfig;
use isodep_lib::descriptor::load_file;
use isodep_lib::manifest::{FsCollector, Record, SavedState, VariableValue, build_isolated};
use isodep_lib::platform::flavor;

use crate::output::{OutputFormat, format_bytes, print_json, print_stat, print_success};

pub struct ManifestArgs {
  pub descriptor: PathBuf,
  pub platform: Option<String>,
  pub root: Option<PathBuf>,
  pub isolated: PathBuf,
  pub state: Option<PathBuf>,
  pub vars: Vec<String>,
}

pub fn cmd_manifest(args: &ManifestArgs, config: &EngineConfig, output: OutputFormat) -> Result<()> {
  let platform = args.platform.clone().unwrap_or_else(flavor);
  let variables = parse_vars(&args.vars, &config.variable, &platform)?;

  let root = match &args.root {
    Some(root) => root.clone(),
    None => args
      .descriptor
      .parent()
      .map(Path::to_path_buf)
      .unwrap_or_else(|| PathBuf::from(".")),
  };

  let store = load_file(&args.descriptor, config)
    .with_context(|| format!("Failed to load {}", args.descriptor.display()))?;
  let vars = store.resolve(&platform);

  let isolated = build_isolated(vars, &platform, &root, &FsCollector).context("Failed to collect files")?;
  isolated.write(&args.isolated)?;

  if let Some(state_path) = &args.state {
    let state = SavedState {
      isolate_file: Some(args.descriptor.display().to_string()),
      variables,
    };
    state.write(state_path)?;
  }

  let total: u64 = isolated.files.values().filter_map(|meta| meta.size).sum();

  if output.is_json() {
    print_json(&json!({
      "isolated": args.isolated.display().to_string(),
      "state": args.state.as_ref().map(|p| p.display().to_string()),
      "os": isolated.os,
      "files": isolated.files.len(),
      "total_bytes": total,
    }))?;
  } else {
    print_success(&format!("Wrote {}", args.isolated.display()));
    print_stat("Platform", &isolated.os);
    print_stat("Files", &isolated.files.len().to_string());
    print_stat("Size", &format_bytes(total));
    if let Some(state_path) = &args.state {
      print_stat("State", &state_path.display().to_string());
    }
  }

  Ok(())
}

/// Parse `NAME=VALUE` pairs. The condition variable is bound to the platform
/// unless given explicitly.
fn parse_vars(pairs: &[String], condition_var: &str, platform: &str) -> Result<BTreeMap<String, VariableValue>> {
  let mut vars = BTreeMap::new();
  for pair in pairs {
    let Some((name, value)) = pair.split_once('=') else {
      bail!("Invalid variable '{pair}', expected NAME=VALUE");
    };
    if name.is_empty() {
      bail!("Invalid variable '{pair}', name is empty");
    }
    vars.insert(name.to_string(), VariableValue::from(value));
  }
  vars
    .entry(condition_var.to_string())
    .or_insert_with(|| VariableValue::Str(platform.to_string()));
  Ok(vars)
}
