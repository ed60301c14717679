//! Rendering of analysis and build results.
//!
//! Text mode prints one block per module to stdout and failures to stderr.
//! JSON mode prints the serialized report instead and leaves failures to the
//! exit status.

use std::fmt::Display;
use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};

use compat_matrix_lib::DependencyEdge;
use compat_matrix_lib::execute::ExecuteSummary;
use compat_matrix_lib::export::ExportRecord;
use compat_matrix_lib::host::ModuleReport;
use compat_matrix_lib::util::hash::ObjectHash;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

const OK_MARK: &str = "✓";
const FAILED_MARK: &str = "✗";
const EDGE_MARK: &str = "→";

/// Characters of an action fingerprint shown next to a module name.
const FINGERPRINT_WIDTH: usize = 8;

fn short_fingerprint(hash: &ObjectHash) -> &str {
  hash.0.get(..FINGERPRINT_WIDTH).unwrap_or(&hash.0)
}

/// Heading of a module block: its name and, once fingerprinted, a short hash.
fn module_heading(module: &ModuleReport) -> String {
  match &module.fingerprint {
    Some(hash) => format!("{} [{}]", module.name, short_fingerprint(hash)),
    None => module.name.clone(),
  }
}

fn elapsed(duration: Duration) -> String {
  if duration < Duration::from_secs(1) {
    format!("{}ms", duration.as_millis())
  } else {
    format!("{:.1}s", duration.as_secs_f64())
  }
}

fn field(label: &str, value: impl Display) {
  println!("  {}: {}", label.if_supports_color(Stream::Stdout, |s| s.dimmed()), value);
}

fn ok_line(message: impl Display) {
  println!("{} {}", OK_MARK.if_supports_color(Stream::Stdout, |s| s.green()), message);
}

/// The composer invocation and install record a module registered.
pub fn print_module(module: &ModuleReport) {
  ok_line(module_heading(module));
  if let Some(action) = &module.action {
    field("Command", &action.command);
    field("Inputs", action.implicit_inputs.len());
    field("Output", &action.output);
  }
  if let Some(install) = &module.install {
    field("Install", install.install_path());
  }
}

pub fn print_failure(module: &str, err: impl Display) {
  eprintln!(
    "{} {}",
    FAILED_MARK.if_supports_color(Stream::Stderr, |s| s.red()),
    format!("{module}: {err}").if_supports_color(Stream::Stderr, |s| s.red())
  );
}

/// One line per module in analysis order, then its declared edges.
pub fn print_graph_step(position: usize, name: &str, edges: &[DependencyEdge]) {
  println!("{position:>3}. {name}");
  for edge in edges {
    println!("       {EDGE_MARK} {} ({})", edge.target, edge.kind);
  }
}

pub fn print_export(name: &str, record: &ExportRecord) {
  println!("# {name}");
  for line in record.to_lines() {
    println!("{line}");
  }
}

pub fn print_build_summary(summary: &ExecuteSummary, duration: Duration) {
  if summary.is_success() {
    ok_line("Build complete!");
  }
  field("Composed", summary.ran.len());
  field("Up to date", summary.up_to_date.len());
  if !summary.skipped.is_empty() {
    field("Skipped", summary.skipped.join(", "));
  }
  field("Duration", elapsed(duration));
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{json}");
  Ok(())
}
