//! Analysis ordering for declared modules.
//!
//! Every declared edge becomes a graph edge from the dependency to the
//! dependent, so a topological walk analyzes each module after everything it
//! reads from. Modules caught in a cycle cannot be ordered; they are reported
//! as a group instead.

use std::collections::HashMap;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::deps::DepKind;

/// One step of the analysis walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisStep {
  /// A module whose dependencies have all been visited.
  Ready(String),
  /// Modules that depend on each other, sorted by name.
  Cycle(Vec<String>),
}

/// Dependency graph over all declared modules.
pub struct AnalysisDag {
  graph: DiGraph<String, DepKind>,
  nodes: HashMap<String, NodeIndex>,
}

impl AnalysisDag {
  /// Create a graph with one node per module, in declaration order.
  pub fn new<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
    let mut graph = DiGraph::new();
    let mut nodes = HashMap::new();

    for name in names {
      let idx = graph.add_node(name.to_string());
      nodes.insert(name.to_string(), idx);
    }

    Self { graph, nodes }
  }

  /// Record that `dependent` reads from `dependency`.
  ///
  /// Returns `false` when either module is unknown. Unknown targets are
  /// reported later, when the dependent looks them up.
  pub fn add_dependency(&mut self, dependent: &str, dependency: &str, kind: DepKind) -> bool {
    match (self.nodes.get(dependency), self.nodes.get(dependent)) {
      (Some(&from), Some(&to)) => {
        self.graph.add_edge(from, to, kind);
        true
      }
      _ => false,
    }
  }

  /// Dependencies first, cycles grouped.
  pub fn analysis_order(&self) -> Vec<AnalysisStep> {
    // tarjan_scc yields components in reverse topological order
    let mut components = tarjan_scc(&self.graph);
    components.reverse();

    components
      .into_iter()
      .map(|component| {
        let cyclic = component.len() > 1 || self.graph.contains_edge(component[0], component[0]);
        if cyclic {
          let mut names: Vec<String> = component.iter().map(|&idx| self.graph[idx].clone()).collect();
          names.sort();
          AnalysisStep::Cycle(names)
        } else {
          AnalysisStep::Ready(self.graph[component[0]].clone())
        }
      })
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn position(order: &[AnalysisStep], name: &str) -> usize {
    order
      .iter()
      .position(|step| matches!(step, AnalysisStep::Ready(n) if n == name))
      .unwrap_or_else(|| panic!("{name} not ready"))
  }

  #[test]
  fn dependencies_come_first() {
    let mut dag = AnalysisDag::new(["matrix", "k1", "k2"]);
    dag.add_dependency("matrix", "k2", DepKind::DerivedConfig);
    dag.add_dependency("matrix", "k1", DepKind::DerivedConfig);

    let order = dag.analysis_order();

    assert_eq!(order.len(), 3);
    assert!(position(&order, "k1") < position(&order, "matrix"));
    assert!(position(&order, "k2") < position(&order, "matrix"));
  }

  #[test]
  fn chains_are_ordered_transitively() {
    let mut dag = AnalysisDag::new(["c", "b", "a"]);
    dag.add_dependency("c", "b", DepKind::Source);
    dag.add_dependency("b", "a", DepKind::Source);

    let order = dag.analysis_order();

    assert!(position(&order, "a") < position(&order, "b"));
    assert!(position(&order, "b") < position(&order, "c"));
  }

  #[test]
  fn cycles_are_grouped() {
    let mut dag = AnalysisDag::new(["x", "y", "free"]);
    dag.add_dependency("x", "y", DepKind::Source);
    dag.add_dependency("y", "x", DepKind::Source);

    let order = dag.analysis_order();

    assert!(order.contains(&AnalysisStep::Cycle(vec!["x".to_string(), "y".to_string()])));
    assert!(order.contains(&AnalysisStep::Ready("free".to_string())));
  }

  #[test]
  fn self_dependency_is_a_cycle() {
    let mut dag = AnalysisDag::new(["m"]);
    dag.add_dependency("m", "m", DepKind::DerivedConfig);

    assert_eq!(dag.analysis_order(), vec![AnalysisStep::Cycle(vec!["m".to_string()])]);
  }

  #[test]
  fn unknown_modules_add_no_edge() {
    let mut dag = AnalysisDag::new(["m"]);

    assert!(!dag.add_dependency("m", "ghost", DepKind::DerivedConfig));
    assert_eq!(dag.analysis_order(), vec![AnalysisStep::Ready("m".to_string())]);
  }
}
