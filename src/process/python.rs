//! Subprocess runner on tokio, raced against a wall-clock timeout.

use std::{process::Stdio, time::Duration};

use tokio::{process::Command, time::timeout};
use tracing::debug;

use super::{ProcessError, ProcessOutput, ProcessRunner};

#[derive(Debug, Clone, Copy, Default)]
pub struct PythonRunner;

impl ProcessRunner for PythonRunner {
    async fn run(&self, program: &str, args: &[String], limit: Duration) -> Result<ProcessOutput, ProcessError> {
        debug!(program, ?args, "spawning");
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // dropping the wait future on timeout kills the child
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|source| ProcessError::Spawn {
            program: program.to_string(),
            source,
        })?;

        let out = timeout(limit, child.wait_with_output())
            .await
            .map_err(|_| ProcessError::Timeout(limit))??;

        Ok(ProcessOutput {
            code: out.status.code(),
            stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
        })
    }
}
