//! Declared properties of a compatibility-matrix module.

use serde::{Deserialize, Serialize};

/// The declarative property set of one compatibility-matrix module.
///
/// A schema is built once when the module is declared. [`CompatMatrixModule`]
/// takes ownership of it and only hands out shared references afterwards.
///
/// [`CompatMatrixModule`]: crate::module::CompatMatrixModule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSchema {
  /// The module's own declared name.
  pub name: String,

  /// Overrides the output filename when set and non-empty.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub stem: Option<String>,

  /// Source files, globs or `:module` references, in declaration order.
  #[serde(default)]
  pub srcs: Vec<String>,

  /// Names of modules that each provide one derived configuration file.
  #[serde(default, alias = "kernel_configs")]
  pub derived_configs: Vec<String>,
}

impl ModuleSchema {
  pub fn new(name: &str) -> Self {
    Self {
      name: name.to_string(),
      stem: None,
      srcs: Vec::new(),
      derived_configs: Vec::new(),
    }
  }

  pub fn with_stem(mut self, stem: &str) -> Self {
    self.stem = Some(stem.to_string());
    self
  }

  pub fn with_srcs<I, S>(mut self, srcs: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.srcs = srcs.into_iter().map(Into::into).collect();
    self
  }

  pub fn with_derived_configs<I, S>(mut self, names: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.derived_configs = names.into_iter().map(Into::into).collect();
    self
  }

  /// The stem, if one was set to a non-empty value.
  pub fn explicit_stem(&self) -> Option<&str> {
    self.stem.as_deref().filter(|s| !s.is_empty())
  }

  /// Filename of the composed output: the stem if set, otherwise the module name.
  pub fn output_name(&self) -> &str {
    self.explicit_stem().unwrap_or(&self.name)
  }

  /// True when neither sources nor derived configs were declared.
  pub fn has_no_inputs(&self) -> bool {
    self.srcs.is_empty() && self.derived_configs.is_empty()
  }
}
