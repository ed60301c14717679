//! Blueprint files: the module declarations a host analyzes.
//!
//! A blueprint is a JSON document with a flat list of typed module
//! declarations:
//!
//! ```json
//! {
//!   "modules": [
//!     { "type": "filegroup", "name": "fragments", "srcs": ["frags/*.xml"] },
//!     { "type": "derived_config", "name": "kernel_4_19", "output": "out/k419.conf" },
//!     {
//!       "type": "compat_matrix",
//!       "name": "framework_compatibility_matrix.5.xml",
//!       "stem": "compatibility_matrix.5.xml",
//!       "srcs": ["matrix.xml", ":fragments"],
//!       "derived_configs": ["kernel_4_19"]
//!     }
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schema::ModuleSchema;

#[derive(Debug, Error)]
pub enum BlueprintError {
  #[error("failed to read blueprint {path}: {source}")]
  Read { path: String, source: std::io::Error },

  #[error("failed to parse blueprint {path}: {source}")]
  Parse { path: String, source: serde_json::Error },

  #[error("module declared without a name")]
  MissingName,
}

/// A module producing one derived configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedConfigDecl {
  pub name: String,
  /// Path of the derived file, relative to the source root.
  pub output: String,
}

/// A named list of source files and globs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilegroupDecl {
  pub name: String,
  #[serde(default)]
  pub srcs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModuleDecl {
  CompatMatrix(ModuleSchema),
  DerivedConfig(DerivedConfigDecl),
  Filegroup(FilegroupDecl),
}

impl ModuleDecl {
  pub fn name(&self) -> &str {
    match self {
      ModuleDecl::CompatMatrix(schema) => &schema.name,
      ModuleDecl::DerivedConfig(decl) => &decl.name,
      ModuleDecl::Filegroup(decl) => &decl.name,
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blueprint {
  #[serde(default)]
  pub modules: Vec<ModuleDecl>,
}

impl Blueprint {
  /// Read and parse a blueprint file.
  pub fn load(path: &Path) -> Result<Self, BlueprintError> {
    let content = fs::read_to_string(path).map_err(|source| BlueprintError::Read {
      path: path.display().to_string(),
      source,
    })?;
    Self::parse(&content, &path.display().to_string())
  }

  /// Parse blueprint JSON. `origin` names the source in error messages.
  pub fn parse(content: &str, origin: &str) -> Result<Self, BlueprintError> {
    let blueprint: Blueprint = serde_json::from_str(content).map_err(|source| BlueprintError::Parse {
      path: origin.to_string(),
      source,
    })?;

    if blueprint.modules.iter().any(|m| m.name().is_empty()) {
      return Err(BlueprintError::MissingName);
    }

    Ok(blueprint)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn parses_all_module_types() {
    let json = r#"{
      "modules": [
        { "type": "filegroup", "name": "fg", "srcs": ["a/*.xml"] },
        { "type": "derived_config", "name": "k1", "output": "out/k1.conf" },
        { "type": "compat_matrix", "name": "m", "stem": "s", "srcs": [":fg"], "derived_configs": ["k1"] }
      ]
    }"#;

    let blueprint = Blueprint::parse(json, "inline").unwrap();

    assert_eq!(blueprint.modules.len(), 3);
    assert_eq!(
      blueprint.modules[2],
      ModuleDecl::CompatMatrix(
        ModuleSchema::new("m")
          .with_stem("s")
          .with_srcs([":fg"])
          .with_derived_configs(["k1"])
      )
    );
  }

  #[test]
  fn unknown_module_type_is_a_parse_error() {
    let json = r#"{ "modules": [ { "type": "cc_binary", "name": "x" } ] }"#;

    let err = Blueprint::parse(json, "inline").unwrap_err();

    assert!(matches!(err, BlueprintError::Parse { .. }));
    assert!(err.to_string().contains("inline"));
  }

  #[test]
  fn empty_name_is_rejected() {
    let json = r#"{ "modules": [ { "type": "compat_matrix", "name": "" } ] }"#;

    assert!(matches!(
      Blueprint::parse(json, "inline"),
      Err(BlueprintError::MissingName)
    ));
  }

  #[test]
  fn load_reports_missing_file() {
    let temp = TempDir::new().unwrap();

    let err = Blueprint::load(&temp.path().join("missing.json")).unwrap_err();

    assert!(matches!(err, BlueprintError::Read { .. }));
  }

  #[test]
  fn load_reads_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("blueprint.json");
    std::fs::write(&path, r#"{ "modules": [] }"#).unwrap();

    assert_eq!(Blueprint::load(&path).unwrap(), Blueprint::default());
  }
}
