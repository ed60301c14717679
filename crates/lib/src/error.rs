//! Error types for module analysis.
//!
//! Two families are kept apart: [`ResolveError`] is raised by the host's
//! collaborators (graph lookup, source resolution) and only passed through by
//! the composition module, while [`AnalysisError`] covers the failures the
//! module itself detects.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::module::ModulePhase;
use crate::placeholder::PlaceholderError;

/// Errors raised by the host when resolving names, paths or graph structure.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ResolveError {
  /// A dependency names a module that was never declared.
  #[error("module '{module}' depends on unknown module '{target}'")]
  UnknownModule { module: String, target: String },

  /// Two modules were declared with the same name.
  #[error("duplicate module name: {0}")]
  DuplicateModule(String),

  /// A literal source path does not exist.
  #[error("module '{module}': source '{path}' does not exist")]
  MissingSource { module: String, path: String },

  /// A glob pattern is not valid.
  #[error("module '{module}': invalid pattern '{pattern}': {message}")]
  InvalidPattern {
    module: String,
    pattern: String,
    message: String,
  },

  /// A glob pattern matched nothing.
  #[error("module '{module}': pattern '{pattern}' matched no files")]
  EmptyGlob { module: String, pattern: String },

  /// A `:module` source reference points at a module without output files.
  #[error("module '{module}': source module '{target}' produces no files")]
  NoSourceFiles { module: String, target: String },

  /// A dependency failed its own analysis.
  #[error("module '{module}': dependency '{target}' failed analysis")]
  DependencyFailed { module: String, target: String },

  /// The module graph contains a cycle.
  #[error("dependency cycle detected involving module '{0}'")]
  Cycle(String),
}

/// Errors detected while analyzing a compatibility-matrix module.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum AnalysisError {
  /// A derived-config dependency lacks the derived-output capability.
  #[error("module '{module}': dependency '{dependency}' listed in derived_configs does not provide {capability}")]
  MissingCapability {
    module: String,
    dependency: String,
    capability: String,
  },

  /// The configured command template could not be rendered.
  #[error("module '{module}': cannot render command template: {source}")]
  Template { module: String, source: PlaceholderError },

  /// A lifecycle callback ran out of order.
  #[error("module '{module}': expected phase {expected}, found {actual}")]
  PhaseOrder {
    module: String,
    expected: ModulePhase,
    actual: ModulePhase,
  },

  /// Raised by a host collaborator and passed through unchanged.
  #[error(transparent)]
  Resolution(#[from] ResolveError),
}

impl AnalysisError {
  /// True for errors that describe a misconfigured module rather than a
  /// host-side resolution failure.
  pub fn is_configuration_error(&self) -> bool {
    matches!(
      self,
      AnalysisError::MissingCapability { .. } | AnalysisError::Template { .. }
    )
  }
}
