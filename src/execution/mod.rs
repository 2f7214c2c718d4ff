//! Execution engine: environment checks, running the program, and the
//! `SUCCESS:<path>` sentinel protocol.

use std::{
    io::Write,
    path::PathBuf,
    time::Duration,
};

use tempfile::{Builder, TempPath};
use tracing::{debug, error, info, warn};

use crate::{
    config::Config,
    error::{PlotError, PlotResult},
    process::{ProcessError, ProcessOutput, ProcessRunner},
    settings::{ErrorMode, RenderConfig},
};

/// Prefix of the one structured line the generated program prints.
pub const SENTINEL: &str = "SUCCESS:";

const MATPLOTLIB_CHECK: &str = "import matplotlib; print(matplotlib.__version__)";

/// Outcome of one program run.
#[derive(Debug, Clone, Default)]
pub struct ExecutionResult {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub artifact: Option<PathBuf>,
}

impl ExecutionResult {
    pub fn from_output(out: ProcessOutput) -> Self {
        let artifact = if out.success() { find_artifact(&out.stdout) } else { None };
        Self { exit_code: out.code, stdout: out.stdout, stderr: out.stderr, artifact }
    }

    /// Map the run onto the artifact path or the matching failure.
    pub fn into_artifact(self, mode: ErrorMode) -> PlotResult<PathBuf> {
        if self.exit_code == Some(0) {
            return match self.artifact {
                Some(path) => {
                    info!("Found output path: {}", path.display());
                    Ok(path)
                }
                None => {
                    warn!("Script executed but no SUCCESS message found");
                    Err(PlotError::ArtifactMissing { stdout: self.stdout })
                }
            };
        }

        let message = if self.stderr.trim().is_empty() { self.stdout } else { self.stderr };
        error!(code = ?self.exit_code, "Script execution failed: {}", message);
        Err(PlotError::Execution { message, warn_only: mode == ErrorMode::Warn })
    }
}

/// First stdout line carrying the sentinel, with the prefix stripped.
pub fn find_artifact(stdout: &str) -> Option<PathBuf> {
    stdout
        .lines()
        .find_map(|line| line.strip_prefix(SENTINEL))
        .map(|rest| PathBuf::from(rest.trim()))
}

pub struct Executor<R> {
    runner: R,
    python: String,
    exec_timeout: Duration,
    check_timeout: Duration,
    keep_temp_files: bool,
    error_mode: ErrorMode,
}

impl<R: ProcessRunner> Executor<R> {
    pub fn new(runner: R, render: &RenderConfig, cfg: &Config) -> Self {
        Self {
            runner,
            python: render.python_path.clone(),
            exec_timeout: cfg.exec_timeout(),
            check_timeout: cfg.check_timeout(),
            keep_temp_files: render.keep_temp_files,
            error_mode: render.error_mode,
        }
    }

    /// Both environment checks; either failing stops the invocation.
    pub async fn preflight(&self) -> PlotResult<()> {
        info!("Checking Python availability...");
        if !self.check_python().await {
            return Err(PlotError::environment(format!(
                "Python not found at '{}'.\nPlease install Python or provide correct path.",
                self.python
            )));
        }
        info!("Checking matplotlib installation...");
        if !self.check_matplotlib().await {
            return Err(PlotError::environment(
                "Matplotlib not installed.\nPlease install it using: pip install matplotlib",
            ));
        }
        Ok(())
    }

    pub async fn check_python(&self) -> bool {
        match self.check_output(&["--version".to_string()]).await {
            Some(out) => {
                // Python 2 printed its version on stderr
                let version = if out.stdout.trim().is_empty() { &out.stderr } else { &out.stdout };
                debug!(code = ?out.code, version = version.trim(), "python check");
                out.success()
            }
            None => false,
        }
    }

    pub async fn check_matplotlib(&self) -> bool {
        match self.check_output(&["-c".to_string(), MATPLOTLIB_CHECK.to_string()]).await {
            Some(out) if out.success() => {
                debug!(version = out.stdout.trim(), "matplotlib check");
                true
            }
            Some(out) => {
                debug!(code = ?out.code, stderr = %out.stderr, "matplotlib check failed");
                false
            }
            None => false,
        }
    }

    async fn check_output(&self, args: &[String]) -> Option<ProcessOutput> {
        match self.runner.run(&self.python, args, self.check_timeout).await {
            Ok(out) => Some(out),
            Err(e) => {
                error!("Environment check failed: {}", e);
                None
            }
        }
    }

    /// Write the program to a temp file, run it, and return the artifact path.
    pub async fn execute(&self, program: &str) -> PlotResult<PathBuf> {
        let script = write_program(program)?;
        info!("Executing: {} {}", self.python, script.display());

        let outcome = self
            .runner
            .run(&self.python, &[script.to_string_lossy().into_owned()], self.exec_timeout)
            .await;
        self.cleanup(script);

        let out = match outcome {
            Ok(out) => out,
            Err(ProcessError::Timeout(limit)) => {
                error!("Script execution timed out");
                return Err(PlotError::ExecutionTimeout(limit.as_secs()));
            }
            Err(e) => {
                error!("Exception during script execution: {}", e);
                return Err(anyhow::Error::new(e).context("Failed to execute script").into());
            }
        };

        let result = ExecutionResult::from_output(out);
        debug!(code = ?result.exit_code, stdout = %result.stdout, stderr = %result.stderr, "execution finished");
        result.into_artifact(self.error_mode)
    }

    fn cleanup(&self, script: TempPath) {
        if self.keep_temp_files {
            match script.keep() {
                Ok(path) => info!("Keeping temp script: {}", path.display()),
                Err(e) => warn!("Failed to keep temp script: {}", e),
            }
            return;
        }
        let path = script.to_path_buf();
        match script.close() {
            Ok(()) => debug!("Temp script file removed"),
            Err(e) => warn!("Failed to remove temp script {}: {}", path.display(), e),
        }
    }
}

fn write_program(program: &str) -> PlotResult<TempPath> {
    let mut file = Builder::new()
        .prefix("plt_ink_")
        .suffix(".py")
        .tempfile()
        .map_err(|e| anyhow::Error::new(e).context("creating temp script"))?;
    file.write_all(program.as_bytes())
        .and_then(|_| file.flush())
        .map_err(|e| anyhow::Error::new(e).context("writing temp script"))?;
    debug!("Wrote script to temp file: {}", file.path().display());
    Ok(file.into_temp_path())
}
