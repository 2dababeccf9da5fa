mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use isodep_lib::config::EngineConfig;

use crate::cmd::{ManifestArgs, ManifestKind};
use crate::output::OutputFormat;

/// isodep - platform-conditional dependency descriptors
#[derive(Parser)]
#[command(name = "isodep")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Output format
  #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
  output: OutputFormat,

  /// Variable tested by condition expressions (overrides ISODEP_CONDITION_VAR)
  #[arg(long, global = true)]
  condition_var: Option<String>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Merge descriptors and print their canonical form
  Merge {
    /// Descriptor files, unioned in order
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Extra platform to resolve (repeatable)
    #[arg(short, long = "platform")]
    platforms: Vec<String>,

    /// Write the result to this file instead of stdout
    #[arg(short, long)]
    write: Option<PathBuf>,
  },

  /// Print the resolved variables of every platform
  Flatten {
    /// Descriptor files, unioned in order
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Extra platform to resolve (repeatable)
    #[arg(short, long = "platform")]
    platforms: Vec<String>,
  },

  /// Resolve one platform and write its .isolated manifest
  Manifest {
    /// Descriptor file
    descriptor: PathBuf,

    /// Platform to resolve (default: host flavor)
    #[arg(short, long)]
    platform: Option<String>,

    /// Directory the dependency paths are relative to (default: descriptor directory)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Output .isolated file
    #[arg(long)]
    isolated: PathBuf,

    /// Output .state file
    #[arg(long)]
    state: Option<PathBuf>,

    /// Variable recorded in the saved state (repeatable)
    #[arg(long = "var", value_name = "NAME=VALUE")]
    vars: Vec<String>,
  },

  /// Validate a .isolated or .state file
  Check {
    /// File to validate
    file: PathBuf,

    /// Kind of record the file holds
    #[arg(long, value_enum, default_value_t = ManifestKind::Isolated)]
    kind: ManifestKind,
  },

  /// Show host platform information
  Info,
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let mut config = EngineConfig::from_env();
  if let Some(var) = cli.condition_var {
    config.variable = var;
  }

  match cli.command {
    Commands::Merge {
      files,
      platforms,
      write,
    } => cmd::cmd_merge(&files, &platforms, write.as_deref(), &config),
    Commands::Flatten { files, platforms } => cmd::cmd_flatten(&files, &platforms, &config, cli.output),
    Commands::Manifest {
      descriptor,
      platform,
      root,
      isolated,
      state,
      vars,
    } => cmd::cmd_manifest(
      &ManifestArgs {
        descriptor,
        platform,
        root,
        isolated,
        state,
        vars,
      },
      &config,
      cli.output,
    ),
    Commands::Check { file, kind } => cmd::cmd_check(&file, kind, cli.verbose, cli.output),
    Commands::Info => cmd::cmd_info(&config, cli.output),
  }
}
