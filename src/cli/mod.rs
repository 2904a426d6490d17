//! CLI module for segcut
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::CliOverrides;

pub mod args;
pub mod commands;

/// segcut
///
/// Removes time ranges from a video, rejoins what is left and uploads the
/// result to remote storage. Results are printed to stdout as JSON; logs go
/// to stderr.
#[derive(Parser, Debug)]
#[command(name = "segcut")]
#[command(about = "Cut time ranges out of a video and deliver the rest")]
#[command(version)]
pub struct Cli {
    /// Configuration file (default: segcut.toml or config/segcut.toml)
    #[arg(long, global = true, env = "SEGCUT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Logging level or filter directive
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            config: self.config.clone(),
            log_level: self.log_level.clone(),
            json_logs: self.json_logs,
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a job: download, cut, upload and print the result envelope
    Run(args::RunArgs),
    /// Print the keep plan and engine arguments for a job without running it
    Plan(args::PlanArgs),
}
