//! Diagnostic logging: an append-only file sink plus warnings on stderr.

use std::{fs::OpenOptions, path::Path, sync::Mutex};

use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter, Layer};

use crate::config::Config;

/// Install the global subscriber for this invocation.
///
/// The file layer is best effort: if the log file cannot be opened the
/// extension keeps running with only the stderr layer.
pub fn init(cfg: &Config) {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .with_ansi(false)
        .with_filter(LevelFilter::WARN);

    let file_layer = if cfg.logging_enabled() {
        open_log(&cfg.log_file()).map(|file| {
            let filter = EnvFilter::try_new(cfg.log_level())
                .unwrap_or_else(|_| EnvFilter::new("debug"));
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_filter(filter)
        })
    } else {
        None
    };

    let subscriber = tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer);

    if let Err(error) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("global logger initialization failed: {}", error);
    }
}

fn open_log(path: &Path) -> Option<std::fs::File> {
    OpenOptions::new().create(true).append(true).open(path).ok()
}
