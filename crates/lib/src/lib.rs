//! compat-matrix-lib: compatibility-matrix composition as a build-graph node
//!
//! A compatibility-matrix module merges a set of matrix fragments, plus the
//! configuration files produced by other modules, into one composed matrix:
//! - `ModuleSchema`: the declared properties of a module
//! - `deps`: typed dependency edges (`Source`, `DerivedConfig`)
//! - `ActionBuilder`: input resolution and the single composer invocation
//! - `ExportRecord`: the legacy key/value projection of the result
//! - `host`: a small reference host that analyzes a JSON blueprint
//! - `execute`: runs composed actions, skipping up-to-date outputs

pub mod compose;
pub mod consts;
pub mod deps;
pub mod error;
pub mod execute;
pub mod export;
pub mod framework;
pub mod host;
pub mod module;
pub mod placeholder;
pub mod schema;
pub mod util;

pub use compose::{ActionBuilder, BuildAction, ComposeConfig, Composition, InstallRecord, OutputArtifact};
pub use deps::{DepKind, DependencyEdge};
pub use error::{AnalysisError, ResolveError};
pub use export::ExportRecord;
pub use module::{CompatMatrixModule, ModulePhase};
pub use schema::ModuleSchema;
