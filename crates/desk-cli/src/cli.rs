use crate::commands::Commands;

use clap::Parser;

#[derive(Parser)]
#[command(name = "desk")]
#[command(about = "Back up and restore a classroom desktop: profiles, widget data and local sites")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,
}
