//! Action generation for compatibility-matrix modules.
//!
//! During analysis the [`ActionBuilder`] turns a module's schema and declared
//! edges into exactly one composer invocation and one install record:
//!
//! 1. `srcs` are resolved through the host's [`SourceResolver`].
//! 2. Derived-config edges are walked in declaration order; each target must
//!    provide a [`DerivedOutputProvider`].
//! 3. The inputs are the resolved sources followed by the derived outputs.
//! 4. The output is named after the stem, or the module when no stem is set,
//!    and placed at a path the host allocates.
//! 5. The command template is rendered and both records are registered.
//!
//! Nothing is registered unless every step succeeds.
//!
//! [`SourceResolver`]: crate::framework::SourceResolver
//! [`DerivedOutputProvider`]: crate::framework::DerivedOutputProvider

mod types;

pub use types::*;

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::consts::INPUT_SEPARATOR;
use crate::deps::{DependencyEdge, derived_config_edges};
use crate::error::AnalysisError;
use crate::framework::{ActionSink, AnalysisCtx, DERIVED_OUTPUT_CAPABILITY, GeneratedPaths};
use crate::placeholder::{self, PlaceholderError, Resolver, Segment};
use crate::schema::ModuleSchema;

/// Generates composition actions from a fixed [`ComposeConfig`].
#[derive(Debug, Clone)]
pub struct ActionBuilder {
  config: ComposeConfig,
  template: Vec<Segment>,
}

impl ActionBuilder {
  /// Parse the configured template once.
  ///
  /// # Errors
  ///
  /// Returns an error if the template is malformed.
  pub fn new(config: ComposeConfig) -> Result<Self, PlaceholderError> {
    let template = placeholder::parse(&config.command_template)?;
    Ok(Self { config, template })
  }

  pub fn config(&self) -> &ComposeConfig {
    &self.config
  }

  /// Resolve inputs, allocate the output and register one build action plus
  /// one install record for `schema`.
  ///
  /// # Errors
  ///
  /// - [`AnalysisError::MissingCapability`] when a derived-config dependency
  ///   does not provide a derived output path.
  /// - [`AnalysisError::Template`] when the command cannot be rendered.
  /// - [`AnalysisError::Resolution`] for anything the host's collaborators
  ///   report, passed through unchanged.
  pub fn generate<C, K>(
    &self,
    schema: &ModuleSchema,
    edges: &[DependencyEdge],
    ctx: &C,
    sink: &mut K,
  ) -> Result<Composition, AnalysisError>
  where
    C: AnalysisCtx + ?Sized,
    K: ActionSink + ?Sized,
  {
    let inputs = self.resolve_inputs(schema, edges, ctx)?;
    self.register(schema, inputs, ctx, sink)
  }

  /// Resolved sources followed by derived-config outputs in declaration order.
  ///
  /// # Errors
  ///
  /// See [`generate`](Self::generate).
  pub fn resolve_inputs<C>(
    &self,
    schema: &ModuleSchema,
    edges: &[DependencyEdge],
    ctx: &C,
  ) -> Result<Vec<String>, AnalysisError>
  where
    C: AnalysisCtx + ?Sized,
  {
    let module = schema.name.as_str();
    let mut inputs = ctx.resolve_sources(module, &schema.srcs)?;

    for edge in derived_config_edges(edges) {
      let dep = ctx.dependency(module, edge)?;
      let provider = dep
        .as_derived_output_provider()
        .ok_or_else(|| AnalysisError::MissingCapability {
          module: module.to_string(),
          dependency: dep.name().to_string(),
          capability: DERIVED_OUTPUT_CAPABILITY.to_string(),
        })?;
      inputs.push(provider.derived_output_path().to_string());
    }

    debug!(module = %module, inputs = ?inputs, "resolved composition inputs");
    Ok(inputs)
  }

  /// Allocate the output for already resolved `inputs` and register the
  /// action and install record.
  ///
  /// # Errors
  ///
  /// Returns [`AnalysisError::Template`] when the command cannot be rendered,
  /// in which case nothing is registered.
  pub fn register<G, K>(
    &self,
    schema: &ModuleSchema,
    inputs: Vec<String>,
    paths: &G,
    sink: &mut K,
  ) -> Result<Composition, AnalysisError>
  where
    G: GeneratedPaths + ?Sized,
    K: ActionSink + ?Sized,
  {
    let module = schema.name.as_str();
    if inputs.is_empty() {
      warn!(module = %module, "composition has no inputs");
    }

    let name = schema.output_name().to_string();
    let path = paths.generated_path(module, &name);

    let command = self.render(module, &inputs, &path)?;

    let action = BuildAction {
      rule: self.config.rule.clone(),
      command,
      implicit_inputs: inputs.clone(),
      output: path.clone(),
    };
    let install = InstallRecord::new(&name, &path);

    info!(
      module = %module,
      output = %path,
      inputs = inputs.len(),
      install = %install.install_path(),
      "registered composition"
    );
    sink.register_build(module, action);
    sink.register_install(module, install);

    Ok(Composition {
      artifact: OutputArtifact { name, path },
      inputs,
    })
  }

  fn render(&self, module: &str, inputs: &[String], out: &str) -> Result<String, AnalysisError> {
    let joined = inputs
      .iter()
      .map(|input| shell_words::quote(input))
      .collect::<Vec<_>>()
      .join(INPUT_SEPARATOR);
    let out = shell_words::quote(out);
    let resolver = CommandResolver {
      tools: &self.config.tools,
      inputs: &joined,
      out: &out,
    };

    placeholder::substitute_segments(&self.template, &resolver).map_err(|source| AnalysisError::Template {
      module: module.to_string(),
      source,
    })
  }
}

struct CommandResolver<'a> {
  tools: &'a BTreeMap<String, String>,
  inputs: &'a str,
  out: &'a str,
}

impl Resolver for CommandResolver<'_> {
  fn resolve_tool(&self, name: &str) -> Result<&str, PlaceholderError> {
    self
      .tools
      .get(name)
      .map(|s| s.as_str())
      .ok_or_else(|| PlaceholderError::UnresolvedTool(name.to_string()))
  }

  fn resolve_in(&self) -> Result<&str, PlaceholderError> {
    Ok(self.inputs)
  }

  fn resolve_out(&self) -> Result<&str, PlaceholderError> {
    Ok(self.out)
  }
}
