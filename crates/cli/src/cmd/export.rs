//! Implementation of the `cmx export` command.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;

use super::{HostArgs, analyze, check_failures};
use crate::output::{OutputFormat, print_export, print_json};

/// Print the legacy `KEY = value` records of every analyzed module.
pub fn cmd_export(blueprint: &Path, host: &HostArgs, output: OutputFormat) -> Result<()> {
  let (report, _) = analyze(blueprint, host)?;

  let records: Vec<_> = report
    .modules
    .iter()
    .filter_map(|m| m.export.as_ref().map(|record| (m.name.as_str(), record)))
    .collect();

  if output.is_json() {
    print_json(&records.into_iter().collect::<BTreeMap<_, _>>())?;
  } else {
    for (i, (name, record)) in records.iter().enumerate() {
      if i > 0 {
        println!();
      }
      print_export(name, record);
    }
  }

  check_failures(&report, !output.is_json())
}
