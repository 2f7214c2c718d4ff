//! Resolving the user's plotting code from the configured source.

use std::fs;

use tracing::{debug, error, info};

use crate::{
    bank::ScriptBank,
    error::{PlotError, PlotResult},
    settings::ScriptSource,
    utils::decode_escapes,
};

/// Load user code. Empty code (after trimming) is a resolution failure too.
pub fn resolve_user_code(source: &ScriptSource, bank: &ScriptBank) -> PlotResult<String> {
    let code = match source {
        ScriptSource::File(path) => {
            info!("Loading script from file: {}", path.display());
            if !path.exists() {
                error!("Script file not found: {}", path.display());
                return Err(PlotError::resolution(format!("Script file not found: {}", path.display())));
            }
            let code = fs::read_to_string(path)
                .map_err(|e| PlotError::resolution(format!("Failed to read script file: {}", e)))?;
            info!("Loaded {} characters from file", code.len());
            code
        }
        ScriptSource::Bank { category, name } => {
            let path = bank.script_path(category, name);
            info!("Loading script from bank: {}", path.display());
            if !path.exists() {
                error!("Bank script not found: {}", path.display());
                return Err(PlotError::resolution(format!(
                    "Bank script not found: {}\n\nPlease ensure the script bank is installed correctly.",
                    path.display()
                )));
            }
            let code = fs::read_to_string(&path)
                .map_err(|e| PlotError::resolution(format!("Failed to read bank script: {}", e)))?;
            info!("Loaded {} characters from bank script", code.len());
            code
        }
        ScriptSource::Inline(raw) => {
            let code = decode_escapes(raw);
            debug!(len = code.len(), "using inline code");
            code
        }
    };

    if code.trim().is_empty() {
        error!("No code provided");
        return Err(PlotError::resolution("No code provided."));
    }
    Ok(code)
}
