use crate::error::{CliError, CliErrorResult};

use std::fmt::Display;
use std::path::PathBuf;
use std::time::SystemTime;

use fern::Dispatch;
use fern::colors::{Color, ColoredLevelConfig};
use log::{Level, info};

/// Initialize logger with fern
///
/// Logs go to stderr so command output on stdout stays machine readable.
///
/// # Arguments
/// * `log_level` - Log level filter
/// * `log_file` - None = stderr, Some = append to this file
/// * `colored` - Enable colored output (ignored when logging to file)
#[track_caller]
pub fn initialize(
    log_level: desk_config::LogLevel,
    log_file: Option<PathBuf>,
    colored: bool,
) -> CliErrorResult<()> {
    let level_filter = log_level.0;

    let dispatch = match log_file {
        Some(ref log_path) => {
            if let Some(parent) = log_path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| CliError::io(parent, e))?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_path)
                .map_err(|e| CliError::io(log_path, e))?;

            formatted(|level| level).chain(file)
        }
        None if colored => {
            let colors = ColoredLevelConfig::new()
                .trace(Color::Magenta)
                .debug(Color::Blue)
                .info(Color::Green)
                .warn(Color::Yellow)
                .error(Color::Red);

            formatted(move |level| colors.color(level)).chain(std::io::stderr())
        }
        None => formatted(|level| level).chain(std::io::stderr()),
    };

    Dispatch::new()
        .level(level_filter)
        .chain(dispatch)
        .apply()
        .map_err(|e| CliError::logger(format!("Failed to initialize logger: {e}")))?;

    match log_file {
        Some(ref path) => info!(
            "Logger initialized: level={:?}, file={}",
            level_filter,
            path.display()
        ),
        None => info!("Logger initialized: level={:?}, stderr", level_filter),
    }

    Ok(())
}

/// `[date - level] message [file:line]`, with `level` rendered by the caller.
fn formatted<L, F>(render_level: F) -> Dispatch
where
    L: Display,
    F: Fn(Level) -> L + Send + Sync + 'static,
{
    Dispatch::new().format(move |out, message, record| {
        out.finish(format_args!(
            "[{date} - {level}] {message} [{file}:{line}]",
            date = humantime::format_rfc3339(SystemTime::now()),
            level = render_level(record.level()),
            message = message,
            file = record.file().unwrap_or("unknown"),
            line = record.line().unwrap_or(0),
        ))
    })
}
