use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::consts::{COMPOSE_RULE, COMPOSER_TOOL, DEFAULT_COMMAND_TEMPLATE, INSTALL_DIR};
use crate::util::hash::Hashable;

/// Configuration of the composition rule.
///
/// Built once by the host and handed to [`ActionBuilder::new`]. The template
/// uses the placeholders described in [`crate::placeholder`]; `tools` maps the
/// tool names it references to their locations.
///
/// [`ActionBuilder::new`]: super::ActionBuilder::new
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposeConfig {
  pub rule: String,
  pub command_template: String,
  pub tools: BTreeMap<String, String>,
}

impl Default for ComposeConfig {
  fn default() -> Self {
    Self::new(COMPOSER_TOOL)
  }
}

impl ComposeConfig {
  /// Default rule and template, with the composer found at `composer_path`.
  pub fn new(composer_path: &str) -> Self {
    Self {
      rule: COMPOSE_RULE.to_string(),
      command_template: DEFAULT_COMMAND_TEMPLATE.to_string(),
      tools: BTreeMap::from([(COMPOSER_TOOL.to_string(), composer_path.to_string())]),
    }
  }

  pub fn with_tool(mut self, name: &str, path: &str) -> Self {
    self.tools.insert(name.to_string(), path.to_string());
    self
  }

  pub fn with_template(mut self, template: &str) -> Self {
    self.command_template = template.to_string();
    self
  }
}

/// The file a module produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputArtifact {
  /// Output filename: the stem if set, otherwise the module name.
  pub name: String,
  /// Generated path allocated by the host.
  pub path: String,
}

/// One registered composer invocation.
///
/// `implicit_inputs` lists every file the command reads, so the host reruns
/// the action whenever one of them changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildAction {
  pub rule: String,
  pub command: String,
  pub implicit_inputs: Vec<String>,
  pub output: String,
}

impl Hashable for BuildAction {}

/// Placement of a produced artifact under the install root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallRecord {
  pub directory: String,
  pub filename: String,
  pub source: String,
}

impl InstallRecord {
  /// Install `source` as `etc/vintf/<filename>`.
  pub fn new(filename: &str, source: &str) -> Self {
    Self {
      directory: INSTALL_DIR.to_string(),
      filename: filename.to_string(),
      source: source.to_string(),
    }
  }

  pub fn install_path(&self) -> String {
    format!("{}/{}", self.directory, self.filename)
  }
}

/// Result of a successful action generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Composition {
  pub artifact: OutputArtifact,
  /// Resolved inputs in command order.
  pub inputs: Vec<String>,
}
