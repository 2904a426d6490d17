// Ports - Interface definitions (contracts)

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::errors::*;
use crate::domain::graph::ProcessingSpec;
use crate::domain::model::*;

/// Port for retrieving the source file
#[async_trait]
pub trait FetchPort: Send + Sync {
    /// Download `url` into `dest`, returning the number of bytes written
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, DomainError>;
}

/// Port for media file probing
#[async_trait]
pub trait ProbePort: Send + Sync {
    /// Duration and present track types of a local file
    async fn probe_media(&self, file_path: &Path) -> Result<MediaDescriptor, DomainError>;
}

/// Port for the external transcoding engine
#[async_trait]
pub trait TranscodePort: Send + Sync {
    /// Run `spec` against `input`, writing `output`
    async fn transcode(
        &self,
        spec: &ProcessingSpec,
        input: &Path,
        output: &Path,
    ) -> Result<(), DomainError>;
}

/// Commit behaviour when finishing an upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub path: String,
    /// Ask the store to pick a free name instead of failing on collision
    pub autorename: bool,
}

impl CommitInfo {
    /// Never overwrite, let the store rename on collision
    pub fn add_with_autorename(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            autorename: true,
        }
    }
}

/// Port for the remote store
#[async_trait]
pub trait StorePort: Send + Sync {
    /// Single-shot upload
    async fn upload(&self, data: Vec<u8>, commit: &CommitInfo) -> Result<StoredFile, DomainError>;

    /// Open a session with the first chunk, returning the session id
    async fn start_session(&self, first_chunk: Vec<u8>) -> Result<String, DomainError>;

    /// Append a chunk at `session.offset`
    async fn append_session(
        &self,
        session: &UploadSession,
        chunk: Vec<u8>,
    ) -> Result<(), DomainError>;

    /// Send the last chunk at `session.offset` and commit
    async fn finish_session(
        &self,
        session: &UploadSession,
        last_chunk: Vec<u8>,
        commit: &CommitInfo,
    ) -> Result<StoredFile, DomainError>;

    /// Whether an entry exists at `path`
    async fn exists(&self, path: &str) -> Result<bool, DomainError>;

    /// Shareable URL for `path`
    async fn create_shared_link(&self, path: &str) -> Result<String, DomainError>;
}

/// Builds a store client for one job's credential
pub trait StoreConnector: Send + Sync {
    fn connect(&self, credential: &str) -> Result<Arc<dyn StorePort>, DomainError>;
}

/// Port for logging and observability
#[async_trait]
pub trait LogPort: Send + Sync {
    /// Log info message
    async fn info(&self, message: &str);

    /// Log warning message
    async fn warn(&self, message: &str);

    /// Log error message
    async fn error(&self, message: &str);

    /// Log debug message
    async fn debug(&self, message: &str);
}
