use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::compose::{BuildAction, InstallRecord};
use crate::deps::DependencyEdge;
use crate::error::AnalysisError;
use crate::export::ExportRecord;
use crate::framework::ActionSink;
use crate::util::hash::ObjectHash;

/// Locations the host works with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostConfig {
  /// Directory source paths and globs are relative to. Actions run here.
  pub src_root: PathBuf,
  /// Directory generated files are allocated under, relative to `src_root`
  /// unless absolute.
  pub out_dir: PathBuf,
  /// Fail analysis when a literal source path does not exist.
  pub check_sources: bool,
}

impl Default for HostConfig {
  fn default() -> Self {
    Self {
      src_root: PathBuf::from("."),
      out_dir: PathBuf::from("out"),
      check_sources: true,
    }
  }
}

/// The host's action and install tables, keyed by module name.
#[derive(Debug, Default)]
pub struct ActionTable {
  pub actions: BTreeMap<String, BuildAction>,
  pub installs: BTreeMap<String, InstallRecord>,
}

impl ActionSink for ActionTable {
  fn register_build(&mut self, module: &str, action: BuildAction) {
    self.actions.insert(module.to_string(), action);
  }

  fn register_install(&mut self, module: &str, install: InstallRecord) {
    self.installs.insert(module.to_string(), install);
  }
}

/// Analysis outcome of one compatibility-matrix module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleReport {
  pub name: String,
  pub dependencies: Vec<DependencyEdge>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub action: Option<BuildAction>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub fingerprint: Option<ObjectHash>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub install: Option<InstallRecord>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub export: Option<ExportRecord>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<AnalysisError>,
}

impl ModuleReport {
  pub fn is_ok(&self) -> bool {
    self.error.is_none()
  }
}

/// Outcome of analyzing a whole blueprint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
  /// Every module name in the order it was visited.
  pub order: Vec<String>,
  /// One report per compatibility-matrix module, in visit order.
  pub modules: Vec<ModuleReport>,
}

impl AnalysisReport {
  pub fn module(&self, name: &str) -> Option<&ModuleReport> {
    self.modules.iter().find(|m| m.name == name)
  }

  pub fn failures(&self) -> impl Iterator<Item = &ModuleReport> {
    self.modules.iter().filter(|m| !m.is_ok())
  }

  pub fn has_failures(&self) -> bool {
    self.failures().next().is_some()
  }

  /// Registered actions in visit order, so dependencies run first.
  pub fn actions(&self) -> impl Iterator<Item = (&str, &BuildAction)> {
    self
      .modules
      .iter()
      .filter_map(|m| m.action.as_ref().map(|a| (m.name.as_str(), a)))
  }
}
