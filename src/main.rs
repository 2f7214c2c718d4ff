use std::{
    fs,
    io::{self, Read, Write},
    process::ExitCode,
};

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use plt_ink::{
    cli::Cli,
    config::Config,
    document::HostDocument,
    error::PlotError,
    handlers::{BankHandler, RenderHandler, Rendered},
    logging,
    process::PythonRunner,
    settings::RenderConfig,
};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();
    let cfg = Config::load();
    logging::init(&cfg);
    info!("{}", "=".repeat(80));
    info!("Starting plt-ink, log file: {}", cfg.log_file().display());

    if args.list_bank {
        return match BankHandler::run(&cfg, &mut io::stdout().lock()) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{:#}", e);
                ExitCode::FAILURE
            }
        };
    }

    let source = match read_document(&args) {
        Ok(s) => s,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let (document, status) = match render(&args, &cfg, source.clone()).await {
        Ok(Some(doc)) => (doc, ExitCode::SUCCESS),
        Ok(None) => return ExitCode::SUCCESS,
        Err(e) if e.is_warning() => {
            warn!("{}", e);
            eprintln!("{}", e);
            (source, ExitCode::SUCCESS)
        }
        Err(e) => {
            report(&e, &cfg);
            (source, ExitCode::FAILURE)
        }
    };

    info!("Extension execution completed");
    if let Err(e) = write_document(&args, &document) {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        return ExitCode::FAILURE;
    }
    status
}

/// The modified document, or `None` after a dry run printed the program.
async fn render(args: &Cli, cfg: &Config, source: String) -> Result<Option<String>, PlotError> {
    let render = RenderConfig::from_cli(args, cfg)?;
    let mut doc = HostDocument::parse(source, &args.ids)?;

    let outcome = RenderHandler::run(PythonRunner, &render, cfg, &mut doc, args.dry_run).await?;
    for w in &outcome.warnings {
        eprintln!("{}", w);
    }
    match outcome.rendered {
        Rendered::Program(program) => {
            println!("{}", program);
            Ok(None)
        }
        Rendered::Inserted(_) => Ok(Some(doc.into_string())),
    }
}

fn report(e: &PlotError, cfg: &Config) {
    error!("{}", e);
    match e {
        PlotError::Other(inner) => {
            error!("{:?}", inner);
            eprintln!("Error: {:#}\n\nCheck log file: {}", inner, cfg.log_file().display());
        }
        _ => eprintln!("{}\n\nCheck log file: {}", e, cfg.log_file().display()),
    }
}

fn read_document(args: &Cli) -> Result<String> {
    match &args.input_file {
        Some(path) => fs::read_to_string(path).with_context(|| format!("reading document: {}", path.display())),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).context("reading document from stdin")?;
            Ok(buf)
        }
    }
}

fn write_document(args: &Cli, document: &str) -> Result<()> {
    match &args.output {
        Some(path) => fs::write(path, document).with_context(|| format!("writing document: {}", path.display())),
        None => {
            let mut out = io::stdout().lock();
            out.write_all(document.as_bytes())?;
            out.flush()?;
            Ok(())
        }
    }
}
