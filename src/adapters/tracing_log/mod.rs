// Tracing log adapter - Structured logging using tracing crate

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::ports::*;

/// Tracing log adapter
///
/// Every record carries the job id so interleaved output from several runs
/// can be told apart.
#[derive(Debug, Clone, Default)]
pub struct TracingLogAdapter {
    job_id: Option<String>,
}

impl TracingLogAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_job(job_id: impl Into<String>) -> Self {
        Self {
            job_id: Some(job_id.into()),
        }
    }

    fn job(&self) -> &str {
        self.job_id.as_deref().unwrap_or("-")
    }
}

#[async_trait]
impl LogPort for TracingLogAdapter {
    async fn info(&self, message: &str) {
        info!(job = self.job(), "{}", message);
    }

    async fn warn(&self, message: &str) {
        warn!(job = self.job(), "{}", message);
    }

    async fn error(&self, message: &str) {
        error!(job = self.job(), "{}", message);
    }

    async fn debug(&self, message: &str) {
        debug!(job = self.job(), "{}", message);
    }
}
