//! Interpreter process management: run a program, capture its output.

use std::time::Duration;

pub mod python;

pub use python::PythonRunner;

/// What a finished process left behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ProcessError {
    #[error("process did not finish within {0:?}")]
    Timeout(Duration),

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Runs an interpreter. Implemented by [`PythonRunner`]; tests substitute
/// their own.
#[allow(async_fn_in_trait)]
pub trait ProcessRunner {
    async fn run(&self, program: &str, args: &[String], limit: Duration) -> Result<ProcessOutput, ProcessError>;
}
