mod build;
mod export;
mod graph;
mod plan;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use compat_matrix_lib::host::{AnalysisReport, Blueprint, HostConfig, Workspace};
use compat_matrix_lib::{ActionBuilder, ComposeConfig};

use crate::output::print_failure;

pub use build::cmd_build;
pub use export::cmd_export;
pub use graph::cmd_graph;
pub use plan::cmd_plan;

/// Host settings shared by every command.
pub struct HostArgs {
  pub src_root: Option<PathBuf>,
  pub out_dir: PathBuf,
  pub composer: String,
  pub check_sources: bool,
}

impl HostArgs {
  /// The explicit source root, or the directory holding the blueprint.
  fn src_root(&self, blueprint: &Path) -> PathBuf {
    match (&self.src_root, blueprint.parent()) {
      (Some(root), _) => root.clone(),
      (None, Some(parent)) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
      _ => PathBuf::from("."),
    }
  }

  fn host_config(&self, blueprint: &Path) -> HostConfig {
    HostConfig {
      src_root: self.src_root(blueprint),
      out_dir: self.out_dir.clone(),
      check_sources: self.check_sources,
    }
  }
}

/// Load `blueprint` and run one analysis pass over it.
fn analyze(blueprint: &Path, host: &HostArgs) -> Result<(AnalysisReport, HostConfig)> {
  let loaded = Blueprint::load(blueprint).context("Failed to load blueprint")?;
  let config = host.host_config(blueprint);

  let builder =
    ActionBuilder::new(ComposeConfig::new(&host.composer)).context("Invalid composer command template")?;
  let workspace = Workspace::new(loaded, config.clone())
    .with_context(|| format!("Invalid blueprint: {}", blueprint.display()))?;

  Ok((workspace.analyze(&builder), config))
}

/// Print every failed module and fail when there is at least one.
fn check_failures(report: &AnalysisReport, print: bool) -> Result<()> {
  let count = report.failures().count();
  if count == 0 {
    return Ok(());
  }

  if print {
    for module in report.failures() {
      if let Some(err) = &module.error {
        print_failure(&module.name, err);
      }
    }
  }
  bail!("{} module(s) failed analysis", count)
}
