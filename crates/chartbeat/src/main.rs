//! Chartbeat - Beat-synced chart choreography
//!
//! Pipeline: find-drop → (external feature extraction) → analyze →
//! choreograph → perform.

mod cli;
mod commands;
mod logging_setup;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;
    let _log_guard = logging_setup::init(&config.logging)?;

    match cli.command {
        Command::FindDrop { .. } => tokio::task::spawn_blocking(move || commands::find_drop(&config))
            .await
            .context("Drop scan task panicked")?,
        Command::Analyze { features } => commands::analyze(&config, &features),
        Command::Choreograph => commands::choreograph(&config),
        Command::Perform { style } => commands::perform(&config, &style.0).await,
    }
}
