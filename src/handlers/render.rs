//! Render handler: one invocation from options to an inserted figure.

use std::{fs, path::Path};

use tracing::{debug, error, info, warn};

use crate::{
    bank::ScriptBank,
    codegen,
    config::Config,
    document::HostDocument,
    error::{PlotError, PlotResult},
    execution::Executor,
    insert::{insert_figure, InsertReport},
    process::ProcessRunner,
    settings::RenderConfig,
};

/// What a successful run produced.
#[derive(Debug)]
pub enum Rendered {
    /// The figure was appended to the document.
    Inserted(InsertReport),
    /// Dry run: the program that would have been executed.
    Program(String),
}

#[derive(Debug)]
pub struct RenderOutcome {
    pub rendered: Rendered,
    /// Non-fatal problems to show the user.
    pub warnings: Vec<PlotError>,
}

pub struct RenderHandler;

impl RenderHandler {
    pub async fn run<R: ProcessRunner>(
        runner: R,
        render: &RenderConfig,
        cfg: &Config,
        doc: &mut HostDocument,
        dry_run: bool,
    ) -> PlotResult<RenderOutcome> {
        info!("Starting matplotlib figure generation");
        match serde_json::to_string(render) {
            Ok(json) => debug!(options = %json, "options"),
            Err(e) => debug!("options not serialisable: {}", e),
        }

        let executor = Executor::new(runner, render, cfg);
        if !dry_run {
            executor.preflight().await?;
            info!("Environment checks passed");
        }

        info!("Generating script...");
        let program = build_program(render, &ScriptBank::from_config(cfg))?;
        info!("Script generated ({} characters)", program.len());

        if dry_run {
            return Ok(RenderOutcome { rendered: Rendered::Program(program), warnings: Vec::new() });
        }

        let mut warnings = Vec::new();
        if let Some(path) = &render.save_script {
            if let Err(e) = save_script(path, &program) {
                warnings.push(e);
            }
        }

        info!("Executing script...");
        let artifact = executor.execute(&program).await?;

        info!("Inserting figure into document...");
        let inserted = insert_figure(doc, &artifact, render);
        let keep = render.keep_temp_files || inserted.as_ref().is_ok_and(InsertReport::links_artifact);
        if !keep {
            remove_artifact(&artifact);
        }
        let report = inserted?;
        info!("Figure inserted successfully as {}", report.id);

        Ok(RenderOutcome { rendered: Rendered::Inserted(report), warnings })
    }
}

fn save_script(path: &Path, program: &str) -> PlotResult<()> {
    info!("Saving script to: {}", path.display());
    fs::write(path, program).map_err(|e| {
        error!("Failed to save script: {}", e);
        PlotError::ScriptSave(e.to_string())
    })?;
    info!("Script saved successfully");
    Ok(())
}

fn remove_artifact(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!("Temporary file removed"),
        Err(e) => warn!("Failed to remove temp file {}: {}", path.display(), e),
    }
}

fn build_program(render: &RenderConfig, bank: &ScriptBank) -> PlotResult<String> {
    let user_code = codegen::resolve_user_code(&render.script, bank)?;
    let include_data = render.data.as_ref().is_some_and(|d| {
        let present = d.path.is_file();
        if !present {
            warn!("Data file not found, skipping data loading: {}", d.path.display());
        }
        present
    });
    let output_path = codegen::temp_output_path(render.figure.output_format);
    Ok(codegen::assemble(render, &user_code, include_data, &output_path)?.text())
}
