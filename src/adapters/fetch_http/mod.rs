// HTTP fetch adapter - Streams the source file to local disk

use std::path::Path;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::domain::errors::*;
use crate::ports::*;

/// Downloads sources over HTTP(S)
pub struct HttpFetchAdapter {
    http: reqwest::Client,
}

impl HttpFetchAdapter {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    fn check_url(url: &str) -> Result<(), DomainError> {
        let url = url.trim();
        if url.starts_with("http://") || url.starts_with("https://") {
            Ok(())
        } else {
            Err(DomainError::InputError(format!(
                "source locator must be an http(s) URL, got '{}'",
                url
            )))
        }
    }
}

impl Default for HttpFetchAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FetchPort for HttpFetchAdapter {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, DomainError> {
        Self::check_url(url)?;
        info!(url, dest = %dest.display(), "Downloading source");

        let mut response = self
            .http
            .get(url.trim())
            .send()
            .await
            .map_err(|e| DomainError::InputError(format!("download failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(DomainError::InputError(format!(
                "download failed with status {}",
                response.status()
            )));
        }

        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| DomainError::FsFail(format!("cannot create {}: {}", dest.display(), e)))?;

        let mut written: u64 = 0;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| DomainError::InputError(format!("download interrupted: {}", e)))?
        {
            file.write_all(&chunk)
                .await
                .map_err(|e| DomainError::FsFail(format!("write to {} failed: {}", dest.display(), e)))?;
            written += chunk.len() as u64;
        }
        file.flush()
            .await
            .map_err(|e| DomainError::FsFail(format!("flush of {} failed: {}", dest.display(), e)))?;

        debug!(bytes = written, "Download complete");
        if written == 0 {
            return Err(DomainError::InputError("downloaded source is empty".to_string()));
        }
        Ok(written)
    }
}
