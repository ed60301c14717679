//! Action execution.
//!
//! Runs registered composition actions one after another, in the order the
//! host analyzed them. An action is skipped when its output is newer than
//! every implicit input and the stamp written next to the output holds the
//! action's fingerprint. [`ExecuteConfig::force`] disables the skip. The first
//! failure stops the run.

mod cmd;
mod types;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, error, info};

use crate::compose::BuildAction;
use crate::consts::STAMP_EXTENSION;
use crate::util::hash::{Hashable, ObjectHash};

pub use cmd::execute_cmd;
pub use types::{ActionOutcome, ExecuteConfig, ExecuteError, ExecuteSummary};

/// Run a single action, unless its output is up to date.
pub async fn execute_action(module: &str, action: &BuildAction, config: &ExecuteConfig) -> Result<ActionOutcome, ExecuteError> {
  let fingerprint = action.compute_hash()?;
  let output = config.root.join(&action.output);
  let stamp = stamp_path(&output);
  let newest_input = newest_input(&config.root, action).await?;

  if !config.force && is_fresh(&output, newest_input).await? && stamp_matches(&stamp, &fingerprint).await? {
    debug!(module = %module, output = %action.output, "output is up to date");
    return Ok(ActionOutcome::UpToDate);
  }

  if let Some(parent) = output.parent() {
    tokio::fs::create_dir_all(parent).await?;
  }
  remove_stamp(&stamp).await?;

  info!(module = %module, output = %action.output, fingerprint = %fingerprint, "composing");
  execute_cmd(&action.command, &config.root).await?;

  tokio::fs::write(&stamp, &fingerprint.0).await?;
  Ok(ActionOutcome::Ran)
}

/// Where the fingerprint of the action that produced `output` is kept.
pub fn stamp_path(output: &Path) -> PathBuf {
  let mut name = output.as_os_str().to_os_string();
  name.push(".");
  name.push(STAMP_EXTENSION);
  PathBuf::from(name)
}

/// Run `actions` in order, stopping at the first failure.
pub async fn execute_all<'a, I>(actions: I, config: &ExecuteConfig) -> ExecuteSummary
where
  I: IntoIterator<Item = (&'a str, &'a BuildAction)>,
{
  let mut summary = ExecuteSummary::default();

  for (module, action) in actions {
    if summary.failed.is_some() {
      summary.skipped.push(module.to_string());
      continue;
    }

    match execute_action(module, action, config).await {
      Ok(ActionOutcome::Ran) => summary.ran.push(module.to_string()),
      Ok(ActionOutcome::UpToDate) => summary.up_to_date.push(module.to_string()),
      Err(err) => {
        error!(module = %module, error = %err, "action failed");
        summary.failed = Some((module.to_string(), err));
      }
    }
  }

  info!(
    ran = summary.ran.len(),
    up_to_date = summary.up_to_date.len(),
    skipped = summary.skipped.len(),
    "execution finished"
  );
  summary
}

/// Modification time of the newest implicit input, `None` without inputs.
async fn newest_input(root: &Path, action: &BuildAction) -> Result<Option<SystemTime>, ExecuteError> {
  let mut newest = None;
  for input in &action.implicit_inputs {
    let metadata = tokio::fs::metadata(root.join(input)).await.map_err(|err| match err.kind() {
      ErrorKind::NotFound => ExecuteError::MissingInput { path: input.clone() },
      _ => ExecuteError::Io(err),
    })?;
    let modified = metadata.modified()?;
    if newest.is_none_or(|n| modified > n) {
      newest = Some(modified);
    }
  }
  Ok(newest)
}

async fn is_fresh(output: &Path, newest_input: Option<SystemTime>) -> Result<bool, ExecuteError> {
  let metadata = match tokio::fs::metadata(output).await {
    Ok(metadata) => metadata,
    Err(err) if err.kind() == ErrorKind::NotFound => return Ok(false),
    Err(err) => return Err(err.into()),
  };
  let built = metadata.modified()?;
  Ok(newest_input.is_none_or(|input| input <= built))
}

async fn stamp_matches(stamp: &Path, fingerprint: &ObjectHash) -> Result<bool, ExecuteError> {
  match tokio::fs::read_to_string(stamp).await {
    Ok(recorded) => Ok(recorded.trim() == fingerprint.0),
    Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
    Err(err) => Err(err.into()),
  }
}

async fn remove_stamp(stamp: &Path) -> Result<(), ExecuteError> {
  match tokio::fs::remove_file(stamp).await {
    Err(err) if err.kind() != ErrorKind::NotFound => Err(err.into()),
    _ => Ok(()),
  }
}
