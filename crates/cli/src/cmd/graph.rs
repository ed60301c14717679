//! Implementation of the `cmx graph` command.
//!
//! Prints every module in the order it is analyzed, with the edges each
//! compatibility-matrix module declared.

use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use compat_matrix_lib::DependencyEdge;

use super::{HostArgs, analyze, check_failures};
use crate::output::{OutputFormat, print_graph_step, print_json};

#[derive(Serialize)]
struct GraphNode<'a> {
  name: &'a str,
  dependencies: &'a [DependencyEdge],
}

pub fn cmd_graph(blueprint: &Path, host: &HostArgs, output: OutputFormat) -> Result<()> {
  let (report, _) = analyze(blueprint, host)?;

  let nodes: Vec<GraphNode> = report
    .order
    .iter()
    .map(|name| GraphNode {
      name,
      dependencies: report.module(name).map(|m| m.dependencies.as_slice()).unwrap_or(&[]),
    })
    .collect();

  if output.is_json() {
    print_json(&nodes)?;
  } else {
    for (i, node) in nodes.iter().enumerate() {
      print_graph_step(i + 1, node.name, node.dependencies);
    }
  }

  check_failures(&report, !output.is_json())
}
