//! desk - classroom desktop backup CLI
//!
//! # Examples
//!
//! ```bash
//! # Back up everything
//! desk export backup.zip
//!
//! # Back up one profile as a single JSON document
//! desk export clase-a.json --profile "Clase A" --format json
//!
//! # Restore, renaming a profile on the way in
//! desk import backup.zip --map "Clase A=Clase B" --pretty
//! ```

use desk_cli::{Cli, CliErrorResult, DeskApp, EXIT_CODE_ABORTED, initialize_logger};
use desk_config::Config;

use std::process::ExitCode;

use clap::Parser;
use log::{error, warn};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let app = match DeskApp::open(&config).await {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to open stores: {e}");
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping at the next safe point");
            on_interrupt.cancel();
        }
    });

    let result = app.run(cli.command, &cancel).await;

    match result {
        Ok(value) => {
            let output = if cli.pretty {
                serde_json::to_string_pretty(&value)
            } else {
                serde_json::to_string(&value)
            };

            match output {
                Ok(json) => {
                    println!("{json}");
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("Error serializing output: {e}");
                    ExitCode::FAILURE
                }
            }
        }
        Err(e) if e.is_aborted() => {
            eprintln!("Aborted");
            ExitCode::from(EXIT_CODE_ABORTED)
        }
        Err(e) => {
            error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Load, validate and log configuration, then start the logger it describes.
fn load_config() -> CliErrorResult<Config> {
    let config = Config::load()?;
    config.validate()?;

    initialize_logger(
        config.logging.level,
        config.log_file_path()?,
        config.logging.colored,
    )?;
    config.log_summary();

    Ok(config)
}
