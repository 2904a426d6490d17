//! FFprobe adapter for media file probing
//!
//! Runs `ffprobe` as a subprocess and reads the container duration and the
//! stream types from its JSON output.

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// FFprobe-based probe adapter
pub struct FFprobeAdapter {
    binary: String,
}

impl FFprobeAdapter {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn args(file_path: &Path) -> Vec<String> {
        vec![
            "-v".to_string(),
            "error".to_string(),
            "-show_entries".to_string(),
            "format=duration:stream=codec_type".to_string(),
            "-of".to_string(),
            "json".to_string(),
            file_path.to_string_lossy().into_owned(),
        ]
    }

    /// Build a descriptor from ffprobe's JSON output
    pub fn parse_output(json: &str) -> Result<MediaDescriptor, DomainError> {
        let output: ProbeOutput = serde_json::from_str(json)
            .map_err(|e| DomainError::ProbeError(format!("unreadable ffprobe output: {}", e)))?;

        let duration = output
            .format
            .and_then(|f| f.duration)
            .ok_or_else(|| DomainError::ProbeError("no duration reported".to_string()))?;
        let duration: f64 = duration
            .trim()
            .parse()
            .map_err(|_| DomainError::ProbeError(format!("invalid duration '{}'", duration)))?;

        let has = |kind: &str| {
            output
                .streams
                .iter()
                .any(|s| s.codec_type.as_deref() == Some(kind))
        };

        MediaDescriptor::new(has("video"), has("audio"), duration)
    }
}

impl Default for FFprobeAdapter {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

#[async_trait]
impl ProbePort for FFprobeAdapter {
    async fn probe_media(&self, file_path: &Path) -> Result<MediaDescriptor, DomainError> {
        let output = Command::new(&self.binary)
            .args(Self::args(file_path))
            .output()
            .await
            .map_err(|e| DomainError::ProbeError(format!("cannot run {}: {}", self.binary, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DomainError::ProbeError(format!(
                "{} exited with {}: {}",
                self.binary,
                output.status,
                stderr.trim()
            )));
        }

        let media = Self::parse_output(&String::from_utf8_lossy(&output.stdout))?;
        debug!(
            duration = media.total_duration,
            video = media.has_video,
            audio = media.has_audio,
            "Probed media"
        );
        Ok(media)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_video_and_audio() {
        let json = r#"{
            "programs": [],
            "streams": [{"codec_type": "video"}, {"codec_type": "audio"}],
            "format": {"duration": "100.000000"}
        }"#;
        let media = FFprobeAdapter::parse_output(json).unwrap();
        assert!(media.has_video);
        assert!(media.has_audio);
        assert_eq!(media.total_duration, 100.0);
    }

    #[test]
    fn test_parse_audio_only_with_data_stream() {
        let json = r#"{
            "streams": [{"codec_type": "audio"}, {"codec_type": "data"}],
            "format": {"duration": "12.5"}
        }"#;
        let media = FFprobeAdapter::parse_output(json).unwrap();
        assert!(!media.has_video);
        assert!(media.has_audio);
    }

    #[test]
    fn test_missing_duration_is_probe_error() {
        let json = r#"{"streams": [{"codec_type": "video"}], "format": {}}"#;
        assert!(matches!(
            FFprobeAdapter::parse_output(json),
            Err(DomainError::ProbeError(_))
        ));
    }

    #[test]
    fn test_non_numeric_duration_is_probe_error() {
        let json = r#"{"streams": [], "format": {"duration": "N/A"}}"#;
        assert!(matches!(
            FFprobeAdapter::parse_output(json),
            Err(DomainError::ProbeError(_))
        ));
    }

    #[test]
    fn test_garbage_is_probe_error() {
        assert!(FFprobeAdapter::parse_output("not json").is_err());
    }

    #[test]
    fn test_args_end_with_input() {
        let args = FFprobeAdapter::args(Path::new("/tmp/in.mp4"));
        assert_eq!(args.last().unwrap(), "/tmp/in.mp4");
        assert!(args.contains(&"format=duration:stream=codec_type".to_string()));
    }
}
