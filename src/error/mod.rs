//! Error handling module for segcut

use thiserror::Error;

use crate::domain::errors::DomainError;

/// Application error type, wrapping the domain taxonomy
#[derive(Error, Debug)]
pub enum SegcutError {
    /// Invalid or unreadable configuration
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Job file missing or unreadable
    #[error("Cannot read job from {source_name}: {message}")]
    JobInput { source_name: String, message: String },

    /// Failure inside the pipeline
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Logging could not be installed
    #[error("Failed to initialize logging: {message}")]
    Logging { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parse error
    #[error("Invalid configuration file: {0}")]
    Toml(#[from] toml::de::Error),
}

impl SegcutError {
    pub fn config(message: impl Into<String>) -> Self {
        SegcutError::Config {
            message: message.into(),
        }
    }
}

/// Result type alias for segcut operations
pub type SegcutResult<T> = std::result::Result<T, SegcutError>;
