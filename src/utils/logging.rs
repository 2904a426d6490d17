//! Logging setup for the binary

use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;
use crate::error::{SegcutError, SegcutResult};

/// Filter from `RUST_LOG` when set, otherwise from the configured level
pub fn env_filter(settings: &LoggingSettings) -> SegcutResult<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&settings.level).map_err(|e| SegcutError::Logging {
            message: format!("invalid level '{}': {}", settings.level, e),
        }),
    }
}

/// Install the global subscriber, writing to stderr
///
/// Stdout carries the result envelope and must stay clean.
pub fn init_logging(settings: &LoggingSettings) -> SegcutResult<()> {
    let filter = env_filter(settings)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let result = if settings.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| SegcutError::Logging {
        message: e.to_string(),
    })
}
