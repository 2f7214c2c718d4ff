//! Failure kinds surfaced to the user. Every one is terminal for the current
//! invocation except the ones `is_warning` reports.

pub type PlotResult<T> = Result<T, PlotError>;

#[derive(thiserror::Error, Debug)]
pub enum PlotError {
    #[error("{0}")]
    EnvironmentUnavailable(String),

    #[error("{0}")]
    ScriptResolution(String),

    #[error("Failed to save script: {0}")]
    ScriptSave(String),

    #[error("{}", execution_message(.message, *.warn_only))]
    Execution { message: String, warn_only: bool },

    #[error("Script execution timed out ({0} seconds).")]
    ExecutionTimeout(u64),

    #[error("Script executed but no output file generated.{}", output_suffix(.stdout))]
    ArtifactMissing { stdout: String },

    #[error("Failed to read figure file: {0}")]
    ArtifactRead(String),

    #[error("Failed to insert figure: {0}")]
    Insertion(String),

    #[error("Failed to read document: {0}")]
    Document(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn execution_message(message: &str, warn_only: bool) -> String {
    if warn_only {
        format!("Warning: Script had errors:\n{}", message)
    } else {
        format!("Script execution failed:\n{}", message)
    }
}

fn output_suffix(stdout: &str) -> String {
    if stdout.trim().is_empty() {
        String::new()
    } else {
        format!("\nOutput: {}", stdout)
    }
}

impl PlotError {
    pub fn environment(msg: impl Into<String>) -> Self {
        Self::EnvironmentUnavailable(msg.into())
    }

    pub fn resolution(msg: impl Into<String>) -> Self {
        Self::ScriptResolution(msg.into())
    }

    pub fn artifact_read(msg: impl Into<String>) -> Self {
        Self::ArtifactRead(msg.into())
    }

    pub fn insertion(msg: impl Into<String>) -> Self {
        Self::Insertion(msg.into())
    }

    pub fn document(msg: impl Into<String>) -> Self {
        Self::Document(msg.into())
    }

    /// Non-fatal failures: the user sees them, the run is not marked failed.
    pub fn is_warning(&self) -> bool {
        match self {
            Self::ScriptSave(_) => true,
            Self::Execution { warn_only, .. } => *warn_only,
            _ => false,
        }
    }
}
