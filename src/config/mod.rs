//! Runtime configuration
//!
//! Settings come from, in increasing precedence: built-in defaults, a TOML
//! file, `SEGCUT_*` environment variables and command-line flags.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::adapters::store_dropbox::MAX_CHUNK_SIZE;
use crate::domain::envelope::DEFAULT_DESTINATION_FOLDER;
use crate::domain::graph::EncoderSettings;
use crate::domain::model::{DEFAULT_CHUNK_SIZE, DEFAULT_TOLERANCE_SECS};
use crate::domain::timestamp::DEFAULT_MS_THRESHOLD;
use crate::error::{SegcutError, SegcutResult};

/// Files looked up, in order, when no `--config` is given
pub const DEFAULT_CONFIG_FILES: &[&str] = &["segcut.toml", "config/segcut.toml"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentSettings {
    /// Minimum length of a kept interval, in seconds
    pub tolerance_secs: f64,
    /// Undeclared magnitudes above this are read as milliseconds
    pub ms_threshold: f64,
}

impl Default for SegmentSettings {
    fn default() -> Self {
        Self {
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
            ms_threshold: DEFAULT_MS_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    pub chunk_size_bytes: u64,
    /// Numbered variants tried after the base name
    pub max_name_attempts: u32,
    pub default_folder: String,
    pub name_prefix: String,
    pub extension: String,
    pub api_base: String,
    pub content_base: String,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            chunk_size_bytes: DEFAULT_CHUNK_SIZE,
            max_name_attempts: 100,
            default_folder: DEFAULT_DESTINATION_FOLDER.to_string(),
            name_prefix: "video_edited".to_string(),
            extension: "mp4".to_string(),
            api_base: crate::adapters::store_dropbox::DEFAULT_API_BASE.to_string(),
            content_base: crate::adapters::store_dropbox::DEFAULT_CONTENT_BASE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub ffmpeg_bin: String,
    pub ffprobe_bin: String,
    pub encoder: EncoderSettings,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            ffmpeg_bin: "ffmpeg".to_string(),
            ffprobe_bin: "ffprobe".to_string(),
            encoder: EncoderSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter directive, e.g. `info` or `segcut=debug`
    pub level: String,
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub segment: SegmentSettings,
    pub upload: UploadSettings,
    pub engine: EngineSettings,
    pub logging: LoggingSettings,
}

/// Overrides taken from the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config: Option<PathBuf>,
    pub log_level: Option<String>,
    pub json_logs: bool,
}

impl Settings {
    /// Resolve settings from every layer
    pub fn load(cli: &CliOverrides) -> SegcutResult<Self> {
        let mut settings = match Self::config_file(cli.config.as_deref())? {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        settings.apply_env(|key| std::env::var(key).ok())?;
        settings.apply_cli(cli);
        settings.validate()?;
        Ok(settings)
    }

    fn config_file(explicit: Option<&Path>) -> SegcutResult<Option<PathBuf>> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(SegcutError::config(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
            return Ok(Some(path.to_path_buf()));
        }
        Ok(DEFAULT_CONFIG_FILES
            .iter()
            .map(PathBuf::from)
            .find(|p| p.is_file()))
    }

    pub fn from_file(path: &Path) -> SegcutResult<Self> {
        info!("Loading configuration from: {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> SegcutResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Apply `SEGCUT_*` variables looked up through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> SegcutResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parsed<T: std::str::FromStr>(key: &str, value: String) -> SegcutResult<T> {
            value
                .trim()
                .parse()
                .map_err(|_| SegcutError::config(format!("{} has invalid value '{}'", key, value)))
        }

        let mut applied = 0;
        let mut get = |key: &str| {
            let value = lookup(key);
            if value.is_some() {
                debug!("Found environment override: {}", key);
                applied += 1;
            }
            value
        };

        if let Some(v) = get("SEGCUT_TOLERANCE_SECS") {
            self.segment.tolerance_secs = parsed("SEGCUT_TOLERANCE_SECS", v)?;
        }
        if let Some(v) = get("SEGCUT_MS_THRESHOLD") {
            self.segment.ms_threshold = parsed("SEGCUT_MS_THRESHOLD", v)?;
        }
        if let Some(v) = get("SEGCUT_CHUNK_SIZE") {
            self.upload.chunk_size_bytes = parsed("SEGCUT_CHUNK_SIZE", v)?;
        }
        if let Some(v) = get("SEGCUT_MAX_NAME_ATTEMPTS") {
            self.upload.max_name_attempts = parsed("SEGCUT_MAX_NAME_ATTEMPTS", v)?;
        }
        if let Some(v) = get("SEGCUT_DEFAULT_FOLDER") {
            self.upload.default_folder = v;
        }
        if let Some(v) = get("SEGCUT_FFMPEG") {
            self.engine.ffmpeg_bin = v;
        }
        if let Some(v) = get("SEGCUT_FFPROBE") {
            self.engine.ffprobe_bin = v;
        }
        if let Some(v) = get("SEGCUT_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = get("SEGCUT_JSON_LOGS") {
            self.logging.json = parsed("SEGCUT_JSON_LOGS", v)?;
        }

        if applied > 0 {
            debug!("Applied {} environment variable overrides", applied);
        }
        Ok(())
    }

    pub fn apply_cli(&mut self, cli: &CliOverrides) {
        if let Some(level) = &cli.log_level {
            self.logging.level = level.clone();
        }
        if cli.json_logs {
            self.logging.json = true;
        }
    }

    pub fn validate(&self) -> SegcutResult<()> {
        if !(self.segment.tolerance_secs.is_finite() && self.segment.tolerance_secs > 0.0) {
            return Err(SegcutError::config("segment.tolerance_secs must be positive"));
        }
        if !(self.segment.ms_threshold.is_finite() && self.segment.ms_threshold > 0.0) {
            return Err(SegcutError::config("segment.ms_threshold must be positive"));
        }
        if self.upload.chunk_size_bytes == 0 {
            return Err(SegcutError::config("upload.chunk_size_bytes must be positive"));
        }
        if self.upload.chunk_size_bytes > MAX_CHUNK_SIZE {
            return Err(SegcutError::config(format!(
                "upload.chunk_size_bytes must be at most {} (150 MiB), got {}",
                MAX_CHUNK_SIZE, self.upload.chunk_size_bytes
            )));
        }
        if self.upload.max_name_attempts == 0 {
            return Err(SegcutError::config("upload.max_name_attempts must be at least 1"));
        }
        if self.upload.extension.trim_start_matches('.').is_empty() {
            return Err(SegcutError::config("upload.extension must not be empty"));
        }
        if self.engine.encoder.crf > 51 {
            return Err(SegcutError::config(format!(
                "engine.encoder.crf must be within 0..=51, got {}",
                self.engine.encoder.crf
            )));
        }
        EnvFilter::try_new(&self.logging.level).map_err(|e| {
            SegcutError::config(format!("invalid log level '{}': {}", self.logging.level, e))
        })?;
        Ok(())
    }
}
