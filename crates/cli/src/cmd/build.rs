//! Implementation of the `cmx build` command.
//!
//! Analyzes a blueprint and runs the registered composer actions in analysis
//! order. Nothing runs when any module fails analysis.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result, bail};

use compat_matrix_lib::execute::{ExecuteConfig, ExecuteError, execute_all};

use super::{HostArgs, analyze, check_failures};
use crate::output::{OutputFormat, print_build_summary, print_failure, print_json};

pub fn cmd_build(blueprint: &Path, host: &HostArgs, force: bool, output: OutputFormat) -> Result<()> {
  let start = Instant::now();
  let (report, host_config) = analyze(blueprint, host)?;
  check_failures(&report, true)?;

  let config = ExecuteConfig {
    root: host_config.src_root,
    force,
  };

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let summary = rt.block_on(execute_all(report.actions(), &config));

  if output.is_json() {
    let failed = summary
      .failed
      .as_ref()
      .map(|(module, err)| serde_json::json!({ "module": module, "error": err.to_string() }));
    print_json(&serde_json::json!({
      "ran": summary.ran,
      "up_to_date": summary.up_to_date,
      "skipped": summary.skipped,
      "failed": failed,
    }))?;
  } else {
    print_build_summary(&summary, start.elapsed());
  }

  if let Some((module, err)) = &summary.failed {
    if !output.is_json() {
      print_failure(module, err);
      if let ExecuteError::CmdFailed { stderr, .. } = err {
        if !stderr.is_empty() {
          eprintln!("{}", stderr);
        }
      }
    }
    bail!("Build failed for module {}", module);
  }

  Ok(())
}
