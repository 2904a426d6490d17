//! Chunked upload of the finished artifact
//!
//! Artifacts no larger than one chunk go up in a single put. Larger ones go
//! through an upload session: start with the first chunk, append full
//! chunks at the acknowledged offset, then finish with the last chunk and a
//! commit that never overwrites. A failure anywhere abandons the session.

use std::path::Path;

use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, info, warn};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::{CommitInfo, StorePort};

/// Transfers an artifact to the store
#[derive(Debug, Clone)]
pub struct ChunkedUploader {
    chunk_size: u64,
}

impl ChunkedUploader {
    pub fn new(chunk_size: u64) -> Result<Self, DomainError> {
        if chunk_size == 0 {
            return Err(DomainError::UploadError(
                "chunk size must be greater than zero".to_string(),
            ));
        }
        Ok(Self { chunk_size })
    }

    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    /// Upload a local file
    pub async fn upload_file(
        &self,
        store: &dyn StorePort,
        path: &Path,
        destination: &DestinationName,
    ) -> Result<UploadReceipt, DomainError> {
        let mut file = tokio::fs::File::open(path).await.map_err(|e| {
            DomainError::UploadError(format!("cannot open {}: {}", path.display(), e))
        })?;
        let size = file
            .metadata()
            .await
            .map_err(|e| DomainError::UploadError(format!("cannot stat {}: {}", path.display(), e)))?
            .len();

        self.upload(store, &mut file, size, destination).await
    }

    /// Upload `size` bytes read from `reader`
    pub async fn upload<R>(
        &self,
        store: &dyn StorePort,
        reader: &mut R,
        size: u64,
        destination: &DestinationName,
    ) -> Result<UploadReceipt, DomainError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let commit = CommitInfo::add_with_autorename(destination.path());

        if size <= self.chunk_size {
            info!(size, path = %destination, "Uploading in a single request");
            let data = read_chunk(reader, size).await?;
            let stored = store.upload(data, &commit).await?;
            return Ok(receipt(stored, 1, destination));
        }

        let total_chunks = size.div_ceil(self.chunk_size);
        info!(size, chunks = total_chunks, path = %destination, "Uploading through a session");

        let first = read_chunk(reader, self.chunk_size).await?;
        let session_id = store.start_session(first).await?;
        let mut session = UploadSession::new(session_id, self.chunk_size, self.chunk_size);
        let mut chunks_uploaded: u32 = 1;

        while size - session.offset > self.chunk_size {
            let chunk = read_chunk(reader, self.chunk_size).await?;
            let written = chunk.len() as u64;
            if let Err(e) = store.append_session(&session, chunk).await {
                warn!(session = %session.session_id, offset = session.offset, "Append failed, abandoning session");
                return Err(e);
            }
            session.advance(written);
            chunks_uploaded += 1;
            debug!(offset = session.offset, size, "Chunk appended");
        }

        let last = read_chunk(reader, size - session.offset).await?;
        let stored = store.finish_session(&session, last, &commit).await?;
        chunks_uploaded += 1;

        Ok(receipt(stored, chunks_uploaded, destination))
    }
}

fn receipt(stored: StoredFile, chunks_uploaded: u32, requested: &DestinationName) -> UploadReceipt {
    if stored.path_display != requested.path() {
        info!(requested = %requested, actual = %stored.path_display, "Store renamed the upload");
    }
    UploadReceipt {
        path_display: stored.path_display,
        name: stored.name,
        chunks_uploaded,
    }
}

async fn read_chunk<R>(reader: &mut R, len: u64) -> Result<Vec<u8>, DomainError>
where
    R: AsyncRead + Unpin + Send,
{
    let len = usize::try_from(len)
        .map_err(|_| DomainError::UploadError(format!("chunk of {} bytes is too large", len)))?;
    let mut buf = vec![0u8; len];
    reader
        .read_exact(&mut buf)
        .await
        .map_err(|e| DomainError::UploadError(format!("reading artifact failed: {}", e)))?;
    Ok(buf)
}
