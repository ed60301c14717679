//! Legacy key/value export of a composed module.
//!
//! Older consumers read a flat record per module: the module class, the file
//! to install, and a few extra directives. The record is a projection of the
//! module's [`OutputArtifact`] and [`ModuleSchema`] and cannot fail.

use serde::{Deserialize, Serialize};

use crate::compose::OutputArtifact;
use crate::consts::{EXPORT_CLASS, INSTALL_RELATIVE_PATH};
use crate::schema::ModuleSchema;

pub const CLASS_KEY: &str = "MODULE_CLASS";
pub const OUTPUT_FILE_KEY: &str = "MODULE_OUTPUT_FILE";
pub const RELATIVE_PATH_KEY: &str = "MODULE_RELATIVE_PATH";
pub const STEM_KEY: &str = "MODULE_STEM";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportEntry {
  pub key: String,
  pub value: String,
}

impl ExportEntry {
  fn new(key: &str, value: &str) -> Self {
    Self {
      key: key.to_string(),
      value: value.to_string(),
    }
  }

  pub fn line(&self) -> String {
    format!("{} = {}", self.key, self.value)
  }
}

/// The legacy export record of one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRecord {
  pub class: String,
  pub output_file: String,
  pub extra: Vec<ExportEntry>,
}

impl ExportRecord {
  /// Value of an extra directive.
  pub fn get(&self, key: &str) -> Option<&str> {
    self.extra.iter().find(|e| e.key == key).map(|e| e.value.as_str())
  }

  /// The extra directives as `KEY = value` lines.
  pub fn extra_lines(&self) -> Vec<String> {
    self.extra.iter().map(ExportEntry::line).collect()
  }

  /// Class, output file and extra directives as `KEY = value` lines.
  pub fn to_lines(&self) -> Vec<String> {
    let mut lines = vec![
      ExportEntry::new(CLASS_KEY, &self.class).line(),
      ExportEntry::new(OUTPUT_FILE_KEY, &self.output_file).line(),
    ];
    lines.extend(self.extra_lines());
    lines
  }
}

/// Project a module's result into its export record.
///
/// The stem directive is only present when the schema sets a non-empty stem.
pub fn export_record(schema: &ModuleSchema, artifact: &OutputArtifact) -> ExportRecord {
  let mut extra = vec![ExportEntry::new(RELATIVE_PATH_KEY, INSTALL_RELATIVE_PATH)];
  if let Some(stem) = schema.explicit_stem() {
    extra.push(ExportEntry::new(STEM_KEY, stem));
  }

  ExportRecord {
    class: EXPORT_CLASS.to_string(),
    output_file: artifact.path.clone(),
    extra,
  }
}
