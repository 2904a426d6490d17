//! FFmpeg execution adapter
//!
//! Executes a processing spec by running the `ffmpeg` binary and waiting for
//! it to exit.

use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, error, info};

use crate::domain::errors::*;
use crate::domain::graph::{EncoderSettings, ProcessingSpec};
use crate::ports::*;

/// Bytes of stderr kept in a failure message
const STDERR_TAIL: usize = 2000;

/// FFmpeg-based execution adapter
pub struct FFmpegAdapter {
    binary: String,
    encoder: EncoderSettings,
}

impl FFmpegAdapter {
    pub fn new(binary: impl Into<String>, encoder: EncoderSettings) -> Self {
        Self {
            binary: binary.into(),
            encoder,
        }
    }
}

impl Default for FFmpegAdapter {
    fn default() -> Self {
        Self::new("ffmpeg", EncoderSettings::default())
    }
}

/// Last `max` bytes of `text`, cut on a char boundary
fn tail(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut start = text.len() - max;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..]
}

#[async_trait]
impl TranscodePort for FFmpegAdapter {
    async fn transcode(
        &self,
        spec: &ProcessingSpec,
        input: &Path,
        output: &Path,
    ) -> Result<(), DomainError> {
        let args = spec.to_args(input, output, &self.encoder);
        info!(
            copy = spec.is_stream_copy(),
            concat = spec.uses_concat(),
            "Running {}",
            self.binary
        );
        debug!(args = %args.join(" "), "Engine arguments");

        let result = Command::new(&self.binary)
            .args(&args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| DomainError::TranscodeError(format!("cannot run {}: {}", self.binary, e)))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            error!(status = %result.status, "Engine failed");
            return Err(DomainError::TranscodeError(format!(
                "{} exited with {}: {}",
                self.binary,
                result.status,
                tail(stderr.trim(), STDERR_TAIL)
            )));
        }

        if !output.exists() {
            return Err(DomainError::TranscodeError(format!(
                "{} produced no output at {}",
                self.binary,
                output.display()
            )));
        }
        Ok(())
    }
}
