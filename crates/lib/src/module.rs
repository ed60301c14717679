//! The compatibility-matrix module and its lifecycle.
//!
//! A host drives each module through its phases in order:
//!
//! ```text
//! Declared -> EdgesDeclared -> InputsResolved -> ActionsRegistered -> Exported
//! ```
//!
//! Each callback checks the current phase and refuses to run out of order. A
//! module whose action generation fails keeps the phase it reached and never
//! becomes exportable.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::compose::{ActionBuilder, Composition, OutputArtifact};
use crate::deps::{self, DependencyEdge};
use crate::error::AnalysisError;
use crate::export::{self, ExportRecord};
use crate::framework::{ActionSink, AnalysisCtx, SourceResolver};
use crate::schema::ModuleSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModulePhase {
  Declared,
  EdgesDeclared,
  InputsResolved,
  ActionsRegistered,
  Exported,
}

impl fmt::Display for ModulePhase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      ModulePhase::Declared => "declared",
      ModulePhase::EdgesDeclared => "edges_declared",
      ModulePhase::InputsResolved => "inputs_resolved",
      ModulePhase::ActionsRegistered => "actions_registered",
      ModulePhase::Exported => "exported",
    };
    f.write_str(name)
  }
}

/// One declared compatibility-matrix module.
#[derive(Debug, Clone)]
pub struct CompatMatrixModule {
  schema: ModuleSchema,
  phase: ModulePhase,
  edges: Vec<DependencyEdge>,
  composition: Option<Composition>,
}

impl CompatMatrixModule {
  pub fn new(schema: ModuleSchema) -> Self {
    Self {
      schema,
      phase: ModulePhase::Declared,
      edges: Vec::new(),
      composition: None,
    }
  }

  pub fn name(&self) -> &str {
    &self.schema.name
  }

  pub fn schema(&self) -> &ModuleSchema {
    &self.schema
  }

  pub fn phase(&self) -> ModulePhase {
    self.phase
  }

  pub fn edges(&self) -> &[DependencyEdge] {
    &self.edges
  }

  pub fn composition(&self) -> Option<&Composition> {
    self.composition.as_ref()
  }

  /// The composed artifact, once actions are registered.
  pub fn artifact(&self) -> Option<&OutputArtifact> {
    self.composition.as_ref().map(|c| &c.artifact)
  }

  /// Declare the module's dependency edges. Runs once, before analysis.
  pub fn declare_dependencies<S>(&mut self, sources: &S) -> Result<&[DependencyEdge], AnalysisError>
  where
    S: SourceResolver + ?Sized,
  {
    self.expect_phase(ModulePhase::Declared)?;
    self.edges = deps::declare_dependencies(&self.schema, sources);
    self.phase = ModulePhase::EdgesDeclared;
    Ok(&self.edges)
  }

  /// Resolve inputs and register the composition action and install record.
  ///
  /// Must run after every derived-config dependency finished its own analysis.
  pub fn generate_build_actions<C, K>(
    &mut self,
    builder: &ActionBuilder,
    ctx: &C,
    sink: &mut K,
  ) -> Result<&Composition, AnalysisError>
  where
    C: AnalysisCtx + ?Sized,
    K: ActionSink + ?Sized,
  {
    self.expect_phase(ModulePhase::EdgesDeclared)?;

    let inputs = builder.resolve_inputs(&self.schema, &self.edges, ctx)?;
    self.phase = ModulePhase::InputsResolved;

    let composition = match builder.register(&self.schema, inputs, ctx, sink) {
      Ok(composition) => composition,
      Err(err) => {
        self.phase = ModulePhase::EdgesDeclared;
        return Err(err);
      }
    };
    self.phase = ModulePhase::ActionsRegistered;
    debug!(module = %self.schema.name, phase = %self.phase, "analysis complete");

    Ok(&*self.composition.insert(composition))
  }

  /// Produce the legacy export record. May be called again once exported.
  pub fn export(&mut self) -> Result<ExportRecord, AnalysisError> {
    if self.phase != ModulePhase::Exported {
      self.expect_phase(ModulePhase::ActionsRegistered)?;
    }

    let artifact = self.artifact().ok_or_else(|| AnalysisError::PhaseOrder {
      module: self.schema.name.clone(),
      expected: ModulePhase::ActionsRegistered,
      actual: self.phase,
    })?;
    let record = export::export_record(&self.schema, artifact);
    self.phase = ModulePhase::Exported;
    Ok(record)
  }

  fn expect_phase(&self, expected: ModulePhase) -> Result<(), AnalysisError> {
    if self.phase == expected {
      Ok(())
    } else {
      Err(AnalysisError::PhaseOrder {
        module: self.schema.name.clone(),
        expected,
        actual: self.phase,
      })
    }
  }
}
