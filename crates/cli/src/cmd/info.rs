use anyhow::Result;
use serde_json::json;

use isodep_lib::config::EngineConfig;
use isodep_lib::platform::flavor;

use crate::output::{OutputFormat, print_json, print_stat};

pub fn cmd_info(config: &EngineConfig, output: OutputFormat) -> Result<()> {
  let platforms: Vec<&str> = config.platforms.iter().map(String::as_str).collect();

  if output.is_json() {
    return print_json(&json!({
      "version": env!("CARGO_PKG_VERSION"),
      "flavor": flavor(),
      "condition_variable": config.variable,
      "platforms": platforms,
    }));
  }

  println!("System:");
  print_stat("Version", env!("CARGO_PKG_VERSION"));
  print_stat("Flavor", &flavor());
  print_stat("Condition variable", &config.variable);
  if platforms.is_empty() {
    print_stat("Extra platforms", "(none)");
  } else {
    print_stat("Extra platforms", &platforms.join(", "));
  }
  Ok(())
}
