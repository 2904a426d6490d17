// In-memory store adapter - Store semantics without a network, for tests and dry runs

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// One recorded call against the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Upload { len: usize },
    Start { len: usize },
    Append { offset: u64, len: usize },
    Finish { offset: u64, len: usize },
    Exists { path: String },
    SharedLink { path: String },
}

#[derive(Debug, Default)]
struct StoreState {
    files: HashMap<String, Vec<u8>>,
    sessions: HashMap<String, Vec<u8>>,
    calls: Vec<StoreCall>,
    next_session: u32,
    appends: u32,
    fail_append_at: Option<u32>,
    fail_upload: bool,
    fail_shared_link: bool,
}

/// Store kept in process memory
///
/// Mirrors the remote store's behaviour: session offsets are checked, commits
/// never overwrite and an occupied path is renamed to `name (n).ext`.
#[derive(Debug, Default)]
pub struct MemoryStoreAdapter {
    state: Mutex<StoreState>,
}

impl MemoryStoreAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Seed a file at `path`
    pub fn insert_file(&self, path: &str, data: Vec<u8>) {
        self.state().files.insert(path.to_string(), data);
    }

    /// Contents stored at `path`
    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.state().files.get(path).cloned()
    }

    /// Every stored path, sorted
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.state().files.keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Data calls made so far; existence probes and link requests excluded
    pub fn calls(&self) -> Vec<StoreCall> {
        self.state()
            .calls
            .iter()
            .filter(|c| !matches!(c, StoreCall::Exists { .. } | StoreCall::SharedLink { .. }))
            .cloned()
            .collect()
    }

    pub fn exists_calls(&self) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|c| matches!(c, StoreCall::Exists { .. }))
            .count()
    }

    /// Number of sessions started but never finished
    pub fn open_sessions(&self) -> usize {
        self.state().sessions.len()
    }

    /// Fail the `n`th append (1-based)
    pub fn fail_append_at(&self, n: u32) {
        self.state().fail_append_at = Some(n);
    }

    /// Fail every single-shot upload and session start
    pub fn fail_uploads(&self) {
        self.state().fail_upload = true;
    }

    pub fn fail_shared_links(&self) {
        self.state().fail_shared_link = true;
    }

    fn commit(state: &mut StoreState, data: Vec<u8>, commit: &CommitInfo) -> Result<StoredFile, DomainError> {
        let path = if state.files.contains_key(&commit.path) {
            if !commit.autorename {
                return Err(DomainError::UploadError(format!(
                    "path/conflict/file: {}",
                    commit.path
                )));
            }
            Self::free_variant(&state.files, &commit.path)
        } else {
            commit.path.clone()
        };

        state.files.insert(path.clone(), data);
        let name = path.rsplit('/').next().unwrap_or_default().to_string();
        Ok(StoredFile {
            path_display: path,
            name,
        })
    }

    fn free_variant(files: &HashMap<String, Vec<u8>>, path: &str) -> String {
        let (dir, file) = path.rsplit_once('/').unwrap_or(("", path));
        let (stem, ext) = match file.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem, format!(".{}", ext)),
            _ => (file, String::new()),
        };

        (1u32..)
            .map(|n| format!("{}/{} ({}){}", dir, stem, n, ext))
            .find(|candidate| !files.contains_key(candidate))
            .unwrap_or_else(|| path.to_string())
    }
}

#[async_trait]
impl StorePort for MemoryStoreAdapter {
    async fn upload(&self, data: Vec<u8>, commit: &CommitInfo) -> Result<StoredFile, DomainError> {
        let mut state = self.state();
        state.calls.push(StoreCall::Upload { len: data.len() });
        if state.fail_upload {
            return Err(DomainError::UploadError("upload rejected".to_string()));
        }
        Self::commit(&mut state, data, commit)
    }

    async fn start_session(&self, first_chunk: Vec<u8>) -> Result<String, DomainError> {
        let mut state = self.state();
        state.calls.push(StoreCall::Start {
            len: first_chunk.len(),
        });
        if state.fail_upload {
            return Err(DomainError::UploadError("session start rejected".to_string()));
        }
        state.next_session += 1;
        let session_id = format!("session-{}", state.next_session);
        state.sessions.insert(session_id.clone(), first_chunk);
        Ok(session_id)
    }

    async fn append_session(&self, session: &UploadSession, chunk: Vec<u8>) -> Result<(), DomainError> {
        let mut state = self.state();
        state.calls.push(StoreCall::Append {
            offset: session.offset,
            len: chunk.len(),
        });
        state.appends += 1;
        if state.fail_append_at == Some(state.appends) {
            return Err(DomainError::UploadError("append rejected".to_string()));
        }

        let buffer = state
            .sessions
            .get_mut(&session.session_id)
            .ok_or_else(|| DomainError::UploadError(format!("unknown session {}", session.session_id)))?;
        if buffer.len() as u64 != session.offset {
            return Err(DomainError::UploadError(format!(
                "incorrect_offset: expected {}, got {}",
                buffer.len(),
                session.offset
            )));
        }
        buffer.extend_from_slice(&chunk);
        Ok(())
    }

    async fn finish_session(
        &self,
        session: &UploadSession,
        last_chunk: Vec<u8>,
        commit: &CommitInfo,
    ) -> Result<StoredFile, DomainError> {
        let mut state = self.state();
        state.calls.push(StoreCall::Finish {
            offset: session.offset,
            len: last_chunk.len(),
        });

        let mut data = state
            .sessions
            .remove(&session.session_id)
            .ok_or_else(|| DomainError::UploadError(format!("unknown session {}", session.session_id)))?;
        if data.len() as u64 != session.offset {
            return Err(DomainError::UploadError(format!(
                "incorrect_offset: expected {}, got {}",
                data.len(),
                session.offset
            )));
        }
        data.extend_from_slice(&last_chunk);
        Self::commit(&mut state, data, commit)
    }

    async fn exists(&self, path: &str) -> Result<bool, DomainError> {
        let mut state = self.state();
        state.calls.push(StoreCall::Exists {
            path: path.to_string(),
        });
        Ok(state.files.contains_key(path))
    }

    async fn create_shared_link(&self, path: &str) -> Result<String, DomainError> {
        let mut state = self.state();
        state.calls.push(StoreCall::SharedLink {
            path: path.to_string(),
        });
        if state.fail_shared_link || !state.files.contains_key(path) {
            return Err(DomainError::LinkError(format!("cannot share {}", path)));
        }
        Ok(format!("https://store.invalid/s{}?dl=0", path))
    }
}

/// Hands out one shared in-memory store regardless of credential
#[derive(Debug, Default, Clone)]
pub struct MemoryStoreConnector {
    store: Arc<MemoryStoreAdapter>,
    credentials: Arc<Mutex<Vec<String>>>,
}

impl MemoryStoreConnector {
    pub fn new(store: Arc<MemoryStoreAdapter>) -> Self {
        Self {
            store,
            credentials: Arc::default(),
        }
    }

    pub fn store(&self) -> Arc<MemoryStoreAdapter> {
        Arc::clone(&self.store)
    }

    /// Credentials seen by `connect`, in order
    pub fn credentials(&self) -> Vec<String> {
        self.credentials
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl StoreConnector for MemoryStoreConnector {
    fn connect(&self, credential: &str) -> Result<Arc<dyn StorePort>, DomainError> {
        self.credentials
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(credential.to_string());
        Ok(Arc::clone(&self.store) as Arc<dyn StorePort>)
    }
}
