use std::path::PathBuf;

use anyhow::{Context, Result};

use isodep_lib::config::EngineConfig;
use isodep_lib::descriptor::{Descriptor, load_files};
use isodep_lib::pretty::to_pretty_string;

use crate::output::{OutputFormat, print_info, print_json};

pub fn cmd_flatten(files: &[PathBuf], platforms: &[String], config: &EngineConfig, output: OutputFormat) -> Result<()> {
  let config = config.clone().with_platforms(platforms.iter().cloned());

  let store = load_files(files, &config).context("Failed to load descriptors")?;
  let flat = store.flatten_known();

  if output.is_json() {
    return print_json(&flat);
  }

  if flat.is_empty() {
    print_info("No platform is named by these descriptors.");
    return Ok(());
  }

  for (platform, vars) in &flat {
    println!("# {platform}");
    let descriptor = Descriptor {
      variables: vars.sorted(),
      ..Default::default()
    };
    print!("{}", to_pretty_string(&descriptor, &config));
  }

  Ok(())
}
