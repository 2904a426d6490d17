//! segcut
//!
//! Cuts time ranges out of a video, rejoins the rest and uploads it.
//!
//! # Usage
//!
//! ```bash
//! segcut run --job job.json
//! cat job.json | segcut run --job -
//! segcut plan --job job.json --duration 120.5
//! ```

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use segcut::cli::{commands, Cli, Commands};
use segcut::config::Settings;
use segcut::utils::logging::init_logging;

/// Main entry point for the segcut CLI application
#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let settings = Settings::load(&cli.overrides()).context("Failed to load configuration")?;
    init_logging(&settings.logging)?;

    info!("Starting segcut");

    let succeeded = match cli.command {
        Commands::Run(args) => {
            info!("Executing run command");
            commands::run(args, &settings).await?
        }
        Commands::Plan(args) => {
            info!("Executing plan command");
            commands::plan(args, &settings)?
        }
    };

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
