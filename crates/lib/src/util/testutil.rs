//! In-memory host collaborators for unit tests.

use std::collections::HashMap;

use crate::compose::{BuildAction, InstallRecord};
use crate::deps::DependencyEdge;
use crate::error::ResolveError;
use crate::framework::{ActionSink, DependencyLookup, DerivedOutputProvider, GeneratedPaths, ModuleHandle, SourceResolver};

/// A dependency that provides one derived output path.
pub struct FakeDerivedConfig {
  pub name: String,
  pub output: String,
}

impl DerivedOutputProvider for FakeDerivedConfig {
  fn derived_output_path(&self) -> &str {
    &self.output
  }
}

impl ModuleHandle for FakeDerivedConfig {
  fn name(&self) -> &str {
    &self.name
  }

  fn kind(&self) -> &'static str {
    "derived_config"
  }

  fn as_derived_output_provider(&self) -> Option<&dyn DerivedOutputProvider> {
    Some(self)
  }
}

/// A dependency without the derived-output capability.
pub struct FakePlainModule {
  pub name: String,
}

impl ModuleHandle for FakePlainModule {
  fn name(&self) -> &str {
    &self.name
  }

  fn kind(&self) -> &'static str {
    "filegroup"
  }
}

/// Resolves sources verbatim, allocates `<gen_dir>/<module>/<name>` and looks
/// dependencies up by name.
pub struct FakeHost {
  pub gen_dir: String,
  modules: HashMap<String, Box<dyn ModuleHandle>>,
}

impl FakeHost {
  pub fn new() -> Self {
    Self {
      gen_dir: "out/gen".to_string(),
      modules: HashMap::new(),
    }
  }

  pub fn with_derived_config(mut self, name: &str, output: &str) -> Self {
    self.modules.insert(
      name.to_string(),
      Box::new(FakeDerivedConfig {
        name: name.to_string(),
        output: output.to_string(),
      }),
    );
    self
  }

  pub fn with_plain_module(mut self, name: &str) -> Self {
    self
      .modules
      .insert(name.to_string(), Box::new(FakePlainModule { name: name.to_string() }));
    self
  }
}

impl SourceResolver for FakeHost {
  fn module_references(&self, srcs: &[String]) -> Vec<String> {
    srcs
      .iter()
      .filter_map(|s| s.strip_prefix(':').map(str::to_string))
      .collect()
  }

  fn resolve_sources(&self, _module: &str, srcs: &[String]) -> Result<Vec<String>, ResolveError> {
    Ok(srcs.to_vec())
  }
}

impl GeneratedPaths for FakeHost {
  fn generated_path(&self, module: &str, name: &str) -> String {
    format!("{}/{}/{}", self.gen_dir, module, name)
  }
}

impl DependencyLookup for FakeHost {
  fn dependency(&self, module: &str, edge: &DependencyEdge) -> Result<&dyn ModuleHandle, ResolveError> {
    self
      .modules
      .get(&edge.target)
      .map(|m| m.as_ref())
      .ok_or_else(|| ResolveError::UnknownModule {
        module: module.to_string(),
        target: edge.target.clone(),
      })
  }
}

/// Records every registration.
#[derive(Default)]
pub struct RecordingSink {
  pub actions: Vec<(String, BuildAction)>,
  pub installs: Vec<(String, InstallRecord)>,
}

impl ActionSink for RecordingSink {
  fn register_build(&mut self, module: &str, action: BuildAction) {
    self.actions.push((module.to_string(), action));
  }

  fn register_install(&mut self, module: &str, install: InstallRecord) {
    self.installs.push((module.to_string(), install));
  }
}
