mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use compat_matrix_lib::consts::{COMPOSER_ENV, COMPOSER_TOOL};

use crate::cmd::HostArgs;
use crate::output::OutputFormat;

/// cmx - compose compatibility matrices from a module blueprint
#[derive(Parser)]
#[command(name = "cmx")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Output format
  #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
  output: OutputFormat,

  /// Directory sources are resolved against (default: the blueprint's directory)
  #[arg(long, global = true)]
  src_root: Option<PathBuf>,

  /// Directory generated files are placed under, relative to the source root
  #[arg(long, global = true, default_value = "out")]
  out_dir: PathBuf,

  /// Location of the composer tool
  #[arg(long, global = true, env = COMPOSER_ENV, default_value = COMPOSER_TOOL)]
  composer: String,

  /// Accept literal source paths without checking that they exist
  #[arg(long, global = true)]
  no_check_sources: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Analyze a blueprint and show the composer actions it would register
  Plan {
    /// Path to the blueprint file
    blueprint: PathBuf,
  },

  /// Print the legacy export records of every module
  Export {
    /// Path to the blueprint file
    blueprint: PathBuf,
  },

  /// Analyze a blueprint and run its composer actions
  Build {
    /// Path to the blueprint file
    blueprint: PathBuf,

    /// Run actions even when their output is up to date
    #[arg(short, long)]
    force: bool,
  },

  /// Show the order modules are analyzed in
  Graph {
    /// Path to the blueprint file
    blueprint: PathBuf,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let host = HostArgs {
    src_root: cli.src_root,
    out_dir: cli.out_dir,
    composer: cli.composer,
    check_sources: !cli.no_check_sources,
  };

  match cli.command {
    Commands::Plan { blueprint } => cmd::cmd_plan(&blueprint, &host, cli.output),
    Commands::Export { blueprint } => cmd::cmd_export(&blueprint, &host, cli.output),
    Commands::Build { blueprint, force } => cmd::cmd_build(&blueprint, &host, force, cli.output),
    Commands::Graph { blueprint } => cmd::cmd_graph(&blueprint, &host, cli.output),
  }
}
