//! desk-cli library
//!
//! Wires configuration, stores and the backup services together behind the
//! `desk` binary. Exposed as a library so the command runner can be tested
//! against in-memory stores.

mod app;
mod cli;
mod commands;
mod error;
mod logger;

#[cfg(test)]
mod tests;

pub use app::DeskApp;
pub use cli::Cli;
pub use commands::{BackupFormat, Commands, parse_profile_mapping};
pub use error::{CliError, CliErrorResult};
pub use logger::initialize as initialize_logger;

/// Exit code reported when the user interrupts a long operation.
pub const EXIT_CODE_ABORTED: u8 = 130;
