use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// PERT-based project estimation CLI.
/// Projects are stored as JSON files in ~/.pe or at a path passed via --db.
#[derive(Parser)]
#[command(name = "pe", version, about = "Software project estimation CLI")]
pub struct Cli {
    /// Path to the project JSON file.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}
