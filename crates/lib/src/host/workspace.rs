//! Blueprint analysis: the host side of every collaborator interface.

use std::collections::HashMap;

use glob::Pattern;
use tracing::{debug, info, warn};

use super::blueprint::{Blueprint, ModuleDecl};
use super::dag::{AnalysisDag, AnalysisStep};
use super::types::{ActionTable, AnalysisReport, HostConfig, ModuleReport};
use crate::compose::ActionBuilder;
use crate::consts::MODULE_REF_PREFIX;
use crate::deps::DependencyEdge;
use crate::error::{AnalysisError, ResolveError};
use crate::framework::{DependencyLookup, DerivedOutputProvider, GeneratedPaths, ModuleHandle, SourceResolver};
use crate::module::CompatMatrixModule;
use crate::util::hash::Hashable;

/// A module that provides one derived configuration file.
#[derive(Debug, Clone)]
pub struct DerivedConfigModule {
  name: String,
  output: String,
}

impl DerivedOutputProvider for DerivedConfigModule {
  fn derived_output_path(&self) -> &str {
    &self.output
  }
}

impl ModuleHandle for DerivedConfigModule {
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

/// A named list of source files and globs.
#[derive(Debug, Clone)]
pub struct FilegroupModule {
  name: String,
  srcs: Vec<String>,
}

impl ModuleHandle for FilegroupModule {
  fn name(&self) -> &str {
    &self.name
  }

  fn kind(&self) -> &'static str {
    "filegroup"
  }
}

/// What dependents see of a compatibility-matrix module.
#[derive(Debug, Clone)]
struct MatrixHandle {
  name: String,
  /// Composed output path, set once analysis succeeded.
  output: Option<String>,
}

impl ModuleHandle for MatrixHandle {
  fn name(&self) -> &str {
    &self.name
  }

  fn kind(&self) -> &'static str {
    "compat_matrix"
  }
}

#[derive(Debug, Clone)]
enum Entry {
  Matrix(MatrixHandle),
  DerivedConfig(DerivedConfigModule),
  Filegroup(FilegroupModule),
}

impl Entry {
  fn handle(&self) -> &dyn ModuleHandle {
    match self {
      Entry::Matrix(m) => m,
      Entry::DerivedConfig(m) => m,
      Entry::Filegroup(m) => m,
    }
  }
}

/// All modules of one blueprint, ready for a single analysis pass.
pub struct Workspace {
  config: HostConfig,
  /// Module names in declaration order.
  names: Vec<String>,
  entries: HashMap<String, Entry>,
  matrices: HashMap<String, CompatMatrixModule>,
}

impl Workspace {
  /// Declare every module of `blueprint`.
  ///
  /// # Errors
  ///
  /// Returns [`ResolveError::DuplicateModule`] if two modules share a name.
  pub fn new(blueprint: Blueprint, config: HostConfig) -> Result<Self, ResolveError> {
    let mut names = Vec::new();
    let mut entries = HashMap::new();
    let mut matrices = HashMap::new();

    for decl in blueprint.modules {
      let name = decl.name().to_string();
      if entries.contains_key(&name) {
        return Err(ResolveError::DuplicateModule(name));
      }

      let entry = match decl {
        ModuleDecl::CompatMatrix(schema) => {
          matrices.insert(name.clone(), CompatMatrixModule::new(schema));
          Entry::Matrix(MatrixHandle {
            name: name.clone(),
            output: None,
          })
        }
        ModuleDecl::DerivedConfig(decl) => Entry::DerivedConfig(DerivedConfigModule {
          name: decl.name,
          output: decl.output,
        }),
        ModuleDecl::Filegroup(decl) => Entry::Filegroup(FilegroupModule {
          name: decl.name,
          srcs: decl.srcs,
        }),
      };

      debug!(module = %name, kind = entry.handle().kind(), "declared module");
      entries.insert(name.clone(), entry);
      names.push(name);
    }

    Ok(Self {
      config,
      names,
      entries,
      matrices,
    })
  }

  /// Run one full analysis pass.
  ///
  /// Edges are declared for every compatibility-matrix module, modules are
  /// visited in dependency order, and each one registers its actions and is
  /// exported. A failing module is reported and its siblings carry on.
  pub fn analyze(mut self, builder: &ActionBuilder) -> AnalysisReport {
    info!(modules = self.names.len(), matrices = self.matrices.len(), "analyzing blueprint");

    let mut table = ActionTable::default();
    let mut errors: HashMap<String, AnalysisError> = HashMap::new();

    for name in &self.names {
      if let Some(module) = self.matrices.get_mut(name) {
        let ctx = HostCtx {
          config: &self.config,
          entries: &self.entries,
        };
        if let Err(err) = module.declare_dependencies(&ctx) {
          errors.insert(name.clone(), err);
        }
      }
    }

    let mut dag = AnalysisDag::new(self.names.iter().map(String::as_str));
    for name in &self.names {
      if let Some(module) = self.matrices.get(name) {
        for edge in module.edges() {
          dag.add_dependency(name, &edge.target, edge.kind);
        }
      }
    }

    let mut order = Vec::new();
    for step in dag.analysis_order() {
      match step {
        AnalysisStep::Ready(name) => {
          if self.matrices.contains_key(&name) && !errors.contains_key(&name) {
            if let Err(err) = self.analyze_matrix(&name, builder, &mut table) {
              warn!(module = %name, error = %err, "analysis failed");
              errors.insert(name.clone(), err);
            }
          }
          order.push(name);
        }
        AnalysisStep::Cycle(names) => {
          for name in names {
            if self.matrices.contains_key(&name) {
              warn!(module = %name, "module is part of a dependency cycle");
              errors.insert(name.clone(), ResolveError::Cycle(name.clone()).into());
            }
            order.push(name);
          }
        }
      }
    }

    let mut modules = Vec::new();
    for name in &order {
      let Some(module) = self.matrices.get_mut(name) else {
        continue;
      };

      let (export, error) = match errors.remove(name) {
        Some(err) => (None, Some(err)),
        None => match module.export() {
          Ok(record) => (Some(record), None),
          Err(err) => (None, Some(err)),
        },
      };

      let action = table.actions.remove(name);
      let fingerprint = action.as_ref().and_then(|a| match a.compute_hash() {
        Ok(hash) => Some(hash),
        Err(err) => {
          warn!(module = %name, error = %err, "cannot fingerprint action");
          None
        }
      });

      modules.push(ModuleReport {
        name: name.clone(),
        dependencies: module.edges().to_vec(),
        action,
        fingerprint,
        install: table.installs.remove(name),
        export,
        error,
      });
    }

    let failed = modules.iter().filter(|m| !m.is_ok()).count();
    info!(analyzed = modules.len(), failed, "analysis finished");

    AnalysisReport { order, modules }
  }

  fn analyze_matrix(&mut self, name: &str, builder: &ActionBuilder, table: &mut ActionTable) -> Result<(), AnalysisError> {
    let Some(module) = self.matrices.get_mut(name) else {
      return Ok(());
    };

    let ctx = HostCtx {
      config: &self.config,
      entries: &self.entries,
    };
    let output = module.generate_build_actions(builder, &ctx, table)?.artifact.path.clone();

    if let Some(Entry::Matrix(handle)) = self.entries.get_mut(name) {
      handle.output = Some(output);
    }
    Ok(())
  }
}

/// Read-only view of the workspace handed to a module during analysis.
struct HostCtx<'a> {
  config: &'a HostConfig,
  entries: &'a HashMap<String, Entry>,
}

impl HostCtx<'_> {
  fn module_files(&self, module: &str, target: &str) -> Result<Vec<String>, ResolveError> {
    let entry = self.entries.get(target).ok_or_else(|| ResolveError::UnknownModule {
      module: module.to_string(),
      target: target.to_string(),
    })?;

    match entry {
      Entry::DerivedConfig(config) => Ok(vec![config.output.clone()]),
      Entry::Matrix(handle) => handle
        .output
        .clone()
        .map(|path| vec![path])
        .ok_or_else(|| ResolveError::DependencyFailed {
          module: module.to_string(),
          target: target.to_string(),
        }),
      Entry::Filegroup(group) => {
        let mut files = Vec::new();
        for src in &group.srcs {
          files.extend(resolve_path(self.config, &group.name, src)?);
        }
        if files.is_empty() {
          return Err(ResolveError::NoSourceFiles {
            module: module.to_string(),
            target: target.to_string(),
          });
        }
        Ok(files)
      }
    }
  }
}

impl SourceResolver for HostCtx<'_> {
  fn module_references(&self, srcs: &[String]) -> Vec<String> {
    srcs
      .iter()
      .filter_map(|s| s.strip_prefix(MODULE_REF_PREFIX))
      .map(str::to_string)
      .collect()
  }

  fn resolve_sources(&self, module: &str, srcs: &[String]) -> Result<Vec<String>, ResolveError> {
    let mut paths = Vec::new();
    for src in srcs {
      match src.strip_prefix(MODULE_REF_PREFIX) {
        Some(target) => paths.extend(self.module_files(module, target)?),
        None => paths.extend(resolve_path(self.config, module, src)?),
      }
    }
    Ok(paths)
  }
}

impl GeneratedPaths for HostCtx<'_> {
  fn generated_path(&self, module: &str, name: &str) -> String {
    self
      .config
      .out_dir
      .join("gen")
      .join(module)
      .join(name)
      .to_string_lossy()
      .into_owned()
  }
}

impl DependencyLookup for HostCtx<'_> {
  fn dependency(&self, module: &str, edge: &DependencyEdge) -> Result<&dyn ModuleHandle, ResolveError> {
    self
      .entries
      .get(&edge.target)
      .map(Entry::handle)
      .ok_or_else(|| ResolveError::UnknownModule {
        module: module.to_string(),
        target: edge.target.clone(),
      })
  }
}

fn is_glob(src: &str) -> bool {
  src.contains(['*', '?', '['])
}

/// Resolve one path or glob relative to the source root.
fn resolve_path(config: &HostConfig, module: &str, src: &str) -> Result<Vec<String>, ResolveError> {
  if is_glob(src) {
    return expand_glob(config, module, src);
  }

  if config.check_sources && !config.src_root.join(src).exists() {
    return Err(ResolveError::MissingSource {
      module: module.to_string(),
      path: src.to_string(),
    });
  }
  Ok(vec![src.to_string()])
}

/// Expand a glob into files relative to the source root, in sorted order.
fn expand_glob(config: &HostConfig, module: &str, pattern: &str) -> Result<Vec<String>, ResolveError> {
  let invalid = |message: String| ResolveError::InvalidPattern {
    module: module.to_string(),
    pattern: pattern.to_string(),
    message,
  };

  let root = Pattern::escape(&config.src_root.to_string_lossy());
  let full = format!("{}/{}", root.trim_end_matches('/'), pattern);

  let mut files = Vec::new();
  for entry in glob::glob(&full).map_err(|e| invalid(e.to_string()))? {
    let path = entry.map_err(|e| invalid(e.to_string()))?;
    if !path.is_file() {
      continue;
    }
    let relative = path.strip_prefix(&config.src_root).unwrap_or(&path);
    files.push(relative.to_string_lossy().into_owned());
  }

  if files.is_empty() {
    return Err(ResolveError::EmptyGlob {
      module: module.to_string(),
      pattern: pattern.to_string(),
    });
  }
  Ok(files)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::compose::ComposeConfig;
  use crate::export::STEM_KEY;
  use std::fs;
  use tempfile::TempDir;

  fn builder() -> ActionBuilder {
    ActionBuilder::new(ComposeConfig::default()).unwrap()
  }

  /// Source tree with the given files, each containing its own name.
  fn source_tree(files: &[&str]) -> TempDir {
    let temp = TempDir::new().unwrap();
    for file in files {
      let path = temp.path().join(file);
      fs::create_dir_all(path.parent().unwrap()).unwrap();
      fs::write(&path, file).unwrap();
    }
    temp
  }

  fn analyze(json: &str, root: &TempDir) -> AnalysisReport {
    let blueprint = Blueprint::parse(json, "test").unwrap();
    let config = HostConfig {
      src_root: root.path().to_path_buf(),
      out_dir: "out".into(),
      check_sources: true,
    };
    Workspace::new(blueprint, config).unwrap().analyze(&builder())
  }

  #[test]
  fn composes_sources_and_derived_configs() {
    let root = source_tree(&["a.xml", "b.xml"]);
    let report = analyze(
      r#"{ "modules": [
        { "type": "compat_matrix", "name": "m", "srcs": ["a.xml", "b.xml"], "derived_configs": ["k1"] },
        { "type": "derived_config", "name": "k1", "output": "out/k1.conf" }
      ] }"#,
      &root,
    );

    let module = report.module("m").unwrap();
    let action = module.action.as_ref().unwrap();
    assert!(module.is_ok());
    assert_eq!(action.implicit_inputs, vec!["a.xml", "b.xml", "out/k1.conf"]);
    assert_eq!(action.command, "composer -i a.xml:b.xml:out/k1.conf -o out/gen/m/m");
    assert_eq!(module.install.as_ref().unwrap().install_path(), "etc/vintf/m");
    assert!(module.fingerprint.is_some());
  }

  #[test]
  fn derived_configs_are_analyzed_first() {
    let root = source_tree(&[]);
    let report = analyze(
      r#"{ "modules": [
        { "type": "compat_matrix", "name": "m", "derived_configs": ["k1"] },
        { "type": "derived_config", "name": "k1", "output": "k1.conf" }
      ] }"#,
      &root,
    );

    let k1 = report.order.iter().position(|n| n == "k1").unwrap();
    let m = report.order.iter().position(|n| n == "m").unwrap();
    assert!(k1 < m);
  }

  #[test]
  fn globs_expand_in_sorted_order() {
    let root = source_tree(&["frags/c.xml", "frags/a.xml", "frags/b.xml", "frags/notes.txt"]);
    let report = analyze(
      r#"{ "modules": [
        { "type": "compat_matrix", "name": "m", "srcs": ["frags/*.xml"] }
      ] }"#,
      &root,
    );

    let action = report.module("m").unwrap().action.as_ref().unwrap();
    assert_eq!(
      action.implicit_inputs,
      vec!["frags/a.xml", "frags/b.xml", "frags/c.xml"]
    );
  }

  #[test]
  fn filegroup_references_expand_in_place() {
    let root = source_tree(&["head.xml", "frags/x.xml", "frags/y.xml", "tail.xml"]);
    let report = analyze(
      r#"{ "modules": [
        { "type": "filegroup", "name": "fg", "srcs": ["frags/*.xml"] },
        { "type": "compat_matrix", "name": "m", "srcs": ["head.xml", ":fg", "tail.xml"] }
      ] }"#,
      &root,
    );

    let module = report.module("m").unwrap();
    assert_eq!(
      module.action.as_ref().unwrap().implicit_inputs,
      vec!["head.xml", "frags/x.xml", "frags/y.xml", "tail.xml"]
    );
    assert_eq!(module.dependencies, vec![DependencyEdge::new("fg", crate::deps::DepKind::Source)]);
  }

  #[test]
  fn matrix_output_can_feed_another_matrix() {
    let root = source_tree(&["base.xml", "extra.xml"]);
    let report = analyze(
      r#"{ "modules": [
        { "type": "compat_matrix", "name": "top", "srcs": [":base", "extra.xml"] },
        { "type": "compat_matrix", "name": "base", "srcs": ["base.xml"] }
      ] }"#,
      &root,
    );

    let top = report.module("top").unwrap().action.as_ref().unwrap();
    assert_eq!(top.implicit_inputs, vec!["out/gen/base/base", "extra.xml"]);
    let actions: Vec<_> = report.actions().map(|(name, _)| name).collect();
    assert_eq!(actions, vec!["base", "top"]);
  }

  #[test]
  fn missing_capability_fails_only_that_module() {
    let root = source_tree(&["a.xml"]);
    let report = analyze(
      r#"{ "modules": [
        { "type": "filegroup", "name": "fg", "srcs": ["a.xml"] },
        { "type": "compat_matrix", "name": "bad", "srcs": ["a.xml"], "derived_configs": ["fg"] },
        { "type": "compat_matrix", "name": "good", "srcs": ["a.xml"] }
      ] }"#,
      &root,
    );

    let bad = report.module("bad").unwrap();
    assert_eq!(
      bad.error,
      Some(AnalysisError::MissingCapability {
        module: "bad".to_string(),
        dependency: "fg".to_string(),
        capability: "DerivedOutputProvider".to_string(),
      })
    );
    assert!(bad.action.is_none());
    assert!(bad.install.is_none());
    assert!(bad.export.is_none());

    assert!(report.module("good").unwrap().is_ok());
    assert_eq!(report.failures().count(), 1);
  }

  #[test]
  fn failed_matrix_fails_its_dependents() {
    let root = source_tree(&["a.xml"]);
    let report = analyze(
      r#"{ "modules": [
        { "type": "compat_matrix", "name": "base", "srcs": ["missing.xml"] },
        { "type": "compat_matrix", "name": "top", "srcs": [":base", "a.xml"] }
      ] }"#,
      &root,
    );

    assert!(matches!(
      report.module("base").unwrap().error,
      Some(AnalysisError::Resolution(ResolveError::MissingSource { .. }))
    ));
    assert_eq!(
      report.module("top").unwrap().error,
      Some(AnalysisError::Resolution(ResolveError::DependencyFailed {
        module: "top".to_string(),
        target: "base".to_string(),
      }))
    );
  }

  #[test]
  fn unknown_dependency_is_reported_by_name() {
    let root = source_tree(&[]);
    let report = analyze(
      r#"{ "modules": [ { "type": "compat_matrix", "name": "m", "derived_configs": ["ghost"] } ] }"#,
      &root,
    );

    let err = report.module("m").unwrap().error.as_ref().unwrap();
    assert!(err.to_string().contains("ghost"));
  }

  #[test]
  fn cycles_fail_every_member() {
    let root = source_tree(&[]);
    let report = analyze(
      r#"{ "modules": [
        { "type": "compat_matrix", "name": "x", "srcs": [":y"] },
        { "type": "compat_matrix", "name": "y", "srcs": [":x"] }
      ] }"#,
      &root,
    );

    assert_eq!(
      report.module("x").unwrap().error,
      Some(AnalysisError::Resolution(ResolveError::Cycle("x".to_string())))
    );
    assert_eq!(report.failures().count(), 2);
  }

  #[test]
  fn unchecked_literal_sources_pass_through() {
    let root = source_tree(&["a.xml"]);
    let blueprint = Blueprint::parse(
      r#"{ "modules": [ { "type": "compat_matrix", "name": "m", "srcs": ["a.xml", "later.xml"] } ] }"#,
      "test",
    )
    .unwrap();
    let config = HostConfig {
      src_root: root.path().to_path_buf(),
      out_dir: "out".into(),
      check_sources: false,
    };

    let report = Workspace::new(blueprint, config).unwrap().analyze(&builder());

    let module = report.module("m").unwrap();
    assert!(module.is_ok());
    assert_eq!(module.action.as_ref().unwrap().implicit_inputs, vec!["a.xml", "later.xml"]);
  }

  #[test]
  fn empty_glob_is_a_resolution_error() {
    let root = source_tree(&[]);
    let report = analyze(
      r#"{ "modules": [ { "type": "compat_matrix", "name": "m", "srcs": ["none/*.xml"] } ] }"#,
      &root,
    );

    assert!(matches!(
      report.module("m").unwrap().error,
      Some(AnalysisError::Resolution(ResolveError::EmptyGlob { .. }))
    ));
  }

  #[test]
  fn stem_reaches_install_and_export() {
    let root = source_tree(&["matrix1.xml", "matrix2.xml"]);
    let report = analyze(
      r#"{ "modules": [
        { "type": "compat_matrix", "name": "compat_matrix", "stem": "custom_matrix",
          "srcs": ["matrix1.xml", "matrix2.xml"] }
      ] }"#,
      &root,
    );

    let module = report.module("compat_matrix").unwrap();
    assert_eq!(
      module.action.as_ref().unwrap().command,
      "composer -i matrix1.xml:matrix2.xml -o out/gen/compat_matrix/custom_matrix"
    );
    assert_eq!(module.install.as_ref().unwrap().install_path(), "etc/vintf/custom_matrix");
    assert_eq!(module.export.as_ref().unwrap().get(STEM_KEY), Some("custom_matrix"));
  }

  #[test]
  fn repeated_passes_are_identical() {
    let root = source_tree(&["a.xml", "b.xml"]);
    let json = r#"{ "modules": [
      { "type": "derived_config", "name": "k1", "output": "k1.conf" },
      { "type": "compat_matrix", "name": "m", "srcs": ["*.xml"], "derived_configs": ["k1"] }
    ] }"#;

    assert_eq!(analyze(json, &root), analyze(json, &root));
  }

  #[test]
  fn duplicate_names_are_rejected() {
    let blueprint = Blueprint::parse(
      r#"{ "modules": [
        { "type": "filegroup", "name": "m" },
        { "type": "compat_matrix", "name": "m" }
      ] }"#,
      "test",
    )
    .unwrap();

    assert_eq!(
      Workspace::new(blueprint, HostConfig::default()).err(),
      Some(ResolveError::DuplicateModule("m".to_string()))
    );
  }
}
