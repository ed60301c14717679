//! Implementation of the `cmx plan` command.
//!
//! Analyzes a blueprint and shows, per compatibility-matrix module, the composer
//! invocation and install record it registers. Nothing is executed.

use std::path::Path;

use anyhow::Result;

use super::{HostArgs, analyze, check_failures};
use crate::output::{OutputFormat, print_json, print_module};

pub fn cmd_plan(blueprint: &Path, host: &HostArgs, output: OutputFormat) -> Result<()> {
  let (report, _) = analyze(blueprint, host)?;

  if output.is_json() {
    print_json(&report)?;
  } else {
    for module in report.modules.iter().filter(|m| m.is_ok()) {
      print_module(module);
    }
  }

  check_failures(&report, !output.is_json())
}
