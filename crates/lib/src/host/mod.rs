//! Reference host for compatibility-matrix modules.
//!
//! The composition module only declares edges and registers actions; it relies
//! on a host for everything else. This module is a small, sequential host that
//! plays those roles for a JSON blueprint:
//!
//! - [`blueprint`] - the blueprint format and loader
//! - [`dag`] - analysis ordering and cycle detection
//! - [`workspace`] - source resolution, generated paths, dependency lookup and
//!   the analysis driver
//!
//! Modules are analyzed one at a time in dependency order. A module that fails
//! does not stop its siblings.

pub mod blueprint;
pub mod dag;
mod types;
pub mod workspace;

pub use blueprint::{Blueprint, BlueprintError, DerivedConfigDecl, FilegroupDecl, ModuleDecl};
pub use types::*;
pub use workspace::Workspace;
