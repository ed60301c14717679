//! Types for action execution.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while running a composed action.
#[derive(Debug, Error)]
pub enum ExecuteError {
  /// The composer exited unsuccessfully.
  #[error("command failed with exit code {code:?}: {cmd}")]
  CmdFailed {
    cmd: String,
    code: Option<i32>,
    stderr: String,
  },

  /// An implicit input does not exist when the action is about to run.
  #[error("input '{path}' does not exist")]
  MissingInput { path: String },

  /// The action could not be fingerprinted.
  #[error("cannot fingerprint action: {0}")]
  Fingerprint(#[from] serde_json::Error),

  /// I/O error during execution.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

/// Configuration for running actions.
#[derive(Debug, Clone)]
pub struct ExecuteConfig {
  /// Working directory of every command. Relative action paths resolve here.
  pub root: PathBuf,
  /// Run actions even when their output is up to date.
  pub force: bool,
}

impl Default for ExecuteConfig {
  fn default() -> Self {
    Self {
      root: PathBuf::from("."),
      force: false,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
  /// The command ran and succeeded.
  Ran,
  /// The output was newer than every input; nothing ran.
  UpToDate,
}

/// Result of running a sequence of actions.
///
/// Execution stops at the first failure; the actions after it are listed in
/// `skipped`.
#[derive(Debug, Default)]
pub struct ExecuteSummary {
  pub ran: Vec<String>,
  pub up_to_date: Vec<String>,
  pub failed: Option<(String, ExecuteError)>,
  pub skipped: Vec<String>,
}

impl ExecuteSummary {
  pub fn is_success(&self) -> bool {
    self.failed.is_none()
  }
}
