//! Collaborator interfaces between the composition module and its host.
//!
//! The module never resolves paths, allocates output locations or keeps action
//! tables itself. A host implements these traits and hands them to the module
//! during each lifecycle phase. [`crate::host::Workspace`] is the reference
//! implementation.

use crate::compose::{BuildAction, InstallRecord};
use crate::deps::DependencyEdge;
use crate::error::ResolveError;

/// Name of the derived-output capability, used in error messages.
pub const DERIVED_OUTPUT_CAPABILITY: &str = "DerivedOutputProvider";

/// Capability of a module that produces exactly one derived configuration file.
pub trait DerivedOutputProvider {
  fn derived_output_path(&self) -> &str;
}

/// A resolved dependency as seen by a depending module.
pub trait ModuleHandle {
  fn name(&self) -> &str;

  /// Module type, for diagnostics.
  fn kind(&self) -> &'static str;

  /// The derived-output capability, if this module has it.
  fn as_derived_output_provider(&self) -> Option<&dyn DerivedOutputProvider> {
    None
  }
}

/// Source path and glob resolution.
pub trait SourceResolver {
  /// Names of the modules referenced from `srcs`, in declaration order.
  fn module_references(&self, srcs: &[String]) -> Vec<String>;

  /// Expand `srcs` into concrete file paths, in declaration order.
  fn resolve_sources(&self, module: &str, srcs: &[String]) -> Result<Vec<String>, ResolveError>;
}

/// Per-module generated-path allocation.
pub trait GeneratedPaths {
  fn generated_path(&self, module: &str, name: &str) -> String;
}

/// Lookup of the module at the far end of a declared edge.
pub trait DependencyLookup {
  fn dependency(&self, module: &str, edge: &DependencyEdge) -> Result<&dyn ModuleHandle, ResolveError>;
}

/// The host's action and install tables.
pub trait ActionSink {
  fn register_build(&mut self, module: &str, action: BuildAction);
  fn register_install(&mut self, module: &str, install: InstallRecord);
}

/// Everything action generation reads from the host.
pub trait AnalysisCtx: SourceResolver + GeneratedPaths + DependencyLookup {}

impl<T: SourceResolver + GeneratedPaths + DependencyLookup + ?Sized> AnalysisCtx for T {}
