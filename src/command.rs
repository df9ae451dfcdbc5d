use std::process::{Output, Stdio};

use tokio::process::Command;
use tracing::{debug, trace};

use crate::Result;

// Only a failure to launch is an error here, callers check the exit status.
pub async fn run(cmd: &mut Command) -> Result<Output> {
  debug!("executing command: {:?}", cmd.as_std());

  let output = cmd
    .stdin(Stdio::null())
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .kill_on_drop(true)
    .output()
    .await?;

  debug!("status: {}", output.status);
  trace!("stderr: {:?}", String::from_utf8_lossy(&output.stderr));

  Ok(output)
}

// ERROR: lines if any, else all of stderr, else the exit status
pub fn failure_message(program: &str, output: &Output) -> String {
  let stderr = String::from_utf8_lossy(&output.stderr);

  let errors: Vec<&str> = stderr
    .lines()
    .map(str::trim)
    .filter(|line| line.starts_with("ERROR:"))
    .collect();
  if !errors.is_empty() {
    return errors.join("\n");
  }

  let stderr = stderr.trim();
  if !stderr.is_empty() {
    return stderr.to_string();
  }

  format!("{program} exited with {}", output.status)
}
