//! Typed dependency edges declared by a compatibility-matrix module.
//!
//! Edges come in two kinds. [`DepKind::Source`] edges point at modules whose
//! files are used as plain sources. [`DepKind::DerivedConfig`] edges point at
//! modules that must expose a [`DerivedOutputProvider`]; only these edges are
//! traversed when the input list is built.
//!
//! [`DerivedOutputProvider`]: crate::framework::DerivedOutputProvider

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::framework::SourceResolver;
use crate::schema::ModuleSchema;

/// The meaning of a dependency edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepKind {
  /// A `:module` reference inside `srcs`.
  Source,
  /// An entry of `derived_configs`.
  DerivedConfig,
}

impl fmt::Display for DepKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      DepKind::Source => write!(f, "source"),
      DepKind::DerivedConfig => write!(f, "derived_config"),
    }
  }
}

/// A declared edge from a module to one of its dependencies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyEdge {
  pub target: String,
  pub kind: DepKind,
}

impl DependencyEdge {
  pub fn new(target: &str, kind: DepKind) -> Self {
    Self {
      target: target.to_string(),
      kind,
    }
  }
}

/// Declare the dependency edges of a module.
///
/// Source edges come first, in the order the resolver reports the `srcs`
/// references, followed by one derived-config edge per `derived_configs`
/// entry in declaration order. A name repeated within one list is declared
/// once. No paths are resolved and nothing is looked up.
pub fn declare_dependencies<S>(schema: &ModuleSchema, sources: &S) -> Vec<DependencyEdge>
where
  S: SourceResolver + ?Sized,
{
  let mut edges = Vec::new();

  push_unique(
    &mut edges,
    &schema.name,
    sources.module_references(&schema.srcs),
    DepKind::Source,
  );
  push_unique(
    &mut edges,
    &schema.name,
    schema.derived_configs.iter().cloned(),
    DepKind::DerivedConfig,
  );

  debug!(module = %schema.name, edges = edges.len(), "declared dependencies");
  edges
}

fn push_unique(edges: &mut Vec<DependencyEdge>, module: &str, names: impl IntoIterator<Item = String>, kind: DepKind) {
  let mut seen = HashSet::new();

  for name in names {
    if !seen.insert(name.clone()) {
      warn!(module = %module, dependency = %name, kind = %kind, "dependency listed more than once");
      continue;
    }
    edges.push(DependencyEdge { target: name, kind });
  }
}

/// The derived-config edges of `edges`, in declaration order.
pub fn derived_config_edges(edges: &[DependencyEdge]) -> impl Iterator<Item = &DependencyEdge> {
  edges.iter().filter(|e| e.kind == DepKind::DerivedConfig)
}
