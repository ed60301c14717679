//! Shell command runner.

use std::path::Path;

use tokio::process::Command;
use tracing::{debug, info};

use super::types::ExecuteError;

/// Run `cmd` through the platform shell in `cwd`.
///
/// The environment is inherited so the composer can be found on `PATH`, with
/// a fixed locale and `SOURCE_DATE_EPOCH` for reproducible output.
///
/// Returns the trimmed stdout on success.
pub async fn execute_cmd(cmd: &str, cwd: &Path) -> Result<String, ExecuteError> {
  info!(cmd = %cmd, "executing command");

  let (shell_cmd, shell_args) = get_shell();

  let mut command = Command::new(shell_cmd);
  command
    .args(shell_args)
    .arg(cmd)
    .current_dir(cwd)
    .env("LANG", "C")
    .env("LC_ALL", "C")
    // 1980-01-01, the ZIP epoch
    .env("SOURCE_DATE_EPOCH", "315532800");

  debug!(shell = %shell_cmd, working_dir = ?cwd, "spawning process");

  let output = command.output().await?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let stdout = String::from_utf8_lossy(&output.stdout);

    if !stdout.is_empty() {
      debug!(stdout = %stdout, "command stdout");
    }

    return Err(ExecuteError::CmdFailed {
      cmd: cmd.to_string(),
      code: output.status.code(),
      stderr,
    });
  }

  let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();

  if !stdout.is_empty() {
    debug!(stdout = %stdout, "command output");
  }

  Ok(stdout)
}

fn get_shell() -> (&'static str, &'static [&'static str]) {
  #[cfg(unix)]
  {
    ("/bin/sh", &["-c"])
  }

  #[cfg(windows)]
  {
    ("cmd.exe", &["/C"])
  }
}
