//! `annotator-replay`: run a recorded session through the editor.
//!
//! Usage: `annotator-replay <session.json> [--config <file>]`

use std::path::PathBuf;
use std::process::ExitCode;

use annotator::{EditorConfig, Session};

const USAGE: &str = "Usage: annotator-replay <session.json> [--config <file>]";

struct Args {
    session: PathBuf,
    config: Option<PathBuf>,
}

fn parse_args() -> Result<Args, String> {
    let mut session = None;
    let mut config = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().ok_or("--config needs a file argument")?;
                config = Some(PathBuf::from(path));
            }
            "-h" | "--help" => return Err(USAGE.to_string()),
            _ if session.is_none() => session = Some(PathBuf::from(arg)),
            _ => return Err(format!("Unexpected argument: {}", arg)),
        }
    }

    let session = session.ok_or_else(|| USAGE.to_string())?;
    Ok(Args { session, config })
}

/// Explicit config file, else the default location, else defaults.
fn load_config(path: Option<&PathBuf>) -> Result<EditorConfig, annotator::ConfigError> {
    match path {
        Some(path) => EditorConfig::load(path),
        None => Ok(EditorConfig::load_from_default_path().unwrap_or_default()),
    }
}

fn init_logging(config: &EditorConfig) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(config.preferences.log_level.to_level_filter());
    // RUST_LOG wins over the configured level
    builder.parse_default_env();
    builder.init();
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(args.config.as_ref())?;
    init_logging(&config);

    let session = Session::load(&args.session)?;
    let outcome = session.replay(config);

    for event in &outcome.events {
        println!("{}", serde_json::to_string_pretty(event)?);
    }
    println!("{}", serde_json::to_string_pretty(&outcome.labels)?);
    log::info!(
        "Replayed {} steps, {} events, {} labels",
        session.steps.len(),
        outcome.events.len(),
        outcome.labels.len()
    );
    Ok(())
}

fn main() -> ExitCode {
    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{}", message);
            return ExitCode::from(2);
        }
    };

    if let Err(e) = run(&args) {
        eprintln!("Replay error: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
