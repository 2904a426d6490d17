//! Command-line argument definitions

use clap::Args;

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Job envelope file, or `-` for stdin
    #[arg(short, long)]
    pub job: String,
}

/// Arguments for the plan command
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Job envelope file, or `-` for stdin
    #[arg(short, long)]
    pub job: String,

    /// Source duration in seconds
    #[arg(short, long)]
    pub duration: f64,

    /// Plan as if the source had no video track
    #[arg(long)]
    pub no_video: bool,

    /// Plan as if the source had no audio track
    #[arg(long)]
    pub no_audio: bool,
}
