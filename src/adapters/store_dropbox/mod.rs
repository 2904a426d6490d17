//! Dropbox store adapter
//!
//! Talks to the Dropbox v2 HTTP API. Content endpoints carry their arguments
//! in the `Dropbox-API-Arg` header and the payload as an octet stream; RPC
//! endpoints take a JSON body.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

pub const DEFAULT_API_BASE: &str = "https://api.dropboxapi.com/2";
pub const DEFAULT_CONTENT_BASE: &str = "https://content.dropboxapi.com/2";

/// Largest request body the content endpoints accept (150 MiB)
pub const MAX_CHUNK_SIZE: u64 = 150 * 1024 * 1024;

const API_ARG_HEADER: &str = "Dropbox-API-Arg";
const OCTET_STREAM: &str = "application/octet-stream";

#[derive(Debug, Deserialize)]
struct FileMetadata {
    name: String,
    path_display: String,
}

#[derive(Debug, Deserialize)]
struct SessionStart {
    session_id: String,
}

#[derive(Debug, Deserialize)]
struct SharedLink {
    url: String,
}

#[derive(Debug, Deserialize)]
struct SharedLinkList {
    links: Vec<SharedLink>,
}

/// Store adapter bound to one access token
pub struct DropboxStoreAdapter {
    http: reqwest::Client,
    token: String,
    api_base: String,
    content_base: String,
}

impl DropboxStoreAdapter {
    pub fn new(http: reqwest::Client, token: impl Into<String>) -> Self {
        Self::with_endpoints(http, token, DEFAULT_API_BASE, DEFAULT_CONTENT_BASE)
    }

    pub fn with_endpoints(
        http: reqwest::Client,
        token: impl Into<String>,
        api_base: impl Into<String>,
        content_base: impl Into<String>,
    ) -> Self {
        Self {
            http,
            token: token.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            content_base: content_base.into().trim_end_matches('/').to_string(),
        }
    }

    fn commit_arg(commit: &CommitInfo) -> Value {
        json!({
            "path": commit.path,
            "mode": "add",
            "autorename": commit.autorename,
            "mute": false,
        })
    }

    fn cursor_arg(session: &UploadSession) -> Value {
        json!({
            "session_id": session.session_id,
            "offset": session.offset,
        })
    }

    fn upload_arg(commit: &CommitInfo) -> Value {
        Self::commit_arg(commit)
    }

    fn start_arg() -> Value {
        json!({ "close": false })
    }

    fn append_arg(session: &UploadSession) -> Value {
        json!({
            "cursor": Self::cursor_arg(session),
            "close": false,
        })
    }

    fn finish_arg(session: &UploadSession, commit: &CommitInfo) -> Value {
        json!({
            "cursor": Self::cursor_arg(session),
            "commit": Self::commit_arg(commit),
        })
    }

    async fn content_call(
        &self,
        endpoint: &str,
        arg: &Value,
        body: Vec<u8>,
    ) -> Result<reqwest::Response, DomainError> {
        let url = format!("{}/{}", self.content_base, endpoint);
        debug!(%url, len = body.len(), "Store content request");

        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(API_ARG_HEADER, api_arg_header(arg))
            .header(CONTENT_TYPE, OCTET_STREAM)
            .body(body)
            .send()
            .await
            .map_err(|e| DomainError::UploadError(format!("{} request failed: {}", endpoint, e)))?;

        ensure_success(response, endpoint, DomainError::UploadError).await
    }

    async fn rpc_call(&self, endpoint: &str, body: &Value) -> Result<reqwest::Response, reqwest::Error> {
        let url = format!("{}/{}", self.api_base, endpoint);
        debug!(%url, "Store RPC request");

        self.http
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .json(body)
            .send()
            .await
    }

    async fn existing_link(&self, path: &str) -> Result<String, DomainError> {
        let response = self
            .rpc_call(
                "sharing/list_shared_links",
                &json!({ "path": path, "direct_only": true }),
            )
            .await
            .map_err(|e| DomainError::LinkError(format!("listing links failed: {}", e)))?;
        let response = ensure_success(response, "sharing/list_shared_links", DomainError::LinkError).await?;

        let list: SharedLinkList = response
            .json()
            .await
            .map_err(|e| DomainError::LinkError(format!("unexpected link list: {}", e)))?;
        list.links
            .into_iter()
            .next()
            .map(|link| link.url)
            .ok_or_else(|| DomainError::LinkError(format!("no shared link for {}", path)))
    }
}

async fn ensure_success(
    response: reqwest::Response,
    context: &str,
    to_error: fn(String) -> DomainError,
) -> Result<reqwest::Response, DomainError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    warn!(%status, context, "Store request failed");
    Err(to_error(format!("{} returned {}: {}", context, status, error_summary(&body))))
}

/// Serialize a content-endpoint argument for the `Dropbox-API-Arg` header.
///
/// Header values must be 7-bit ASCII, so every other char is written as a
/// JSON `\uXXXX` escape (a surrogate pair outside the BMP).
fn api_arg_header(arg: &Value) -> String {
    let raw = arg.to_string();
    let mut out = String::with_capacity(raw.len());
    let mut units = [0u16; 2];
    for c in raw.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            for unit in c.encode_utf16(&mut units).iter() {
                out.push_str(&format!("\\u{:04x}", unit));
            }
        }
    }
    out
}

/// `error_summary` field of a Dropbox error body, or the raw text
fn error_summary(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error_summary").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

fn into_stored(metadata: FileMetadata) -> StoredFile {
    StoredFile {
        path_display: metadata.path_display,
        name: metadata.name,
    }
}

#[async_trait]
impl StorePort for DropboxStoreAdapter {
    async fn upload(&self, data: Vec<u8>, commit: &CommitInfo) -> Result<StoredFile, DomainError> {
        let response = self
            .content_call("files/upload", &Self::upload_arg(commit), data)
            .await?;
        let metadata: FileMetadata = response
            .json()
            .await
            .map_err(|e| DomainError::UploadError(format!("unexpected upload response: {}", e)))?;
        Ok(into_stored(metadata))
    }

    async fn start_session(&self, first_chunk: Vec<u8>) -> Result<String, DomainError> {
        let response = self
            .content_call("files/upload_session/start", &Self::start_arg(), first_chunk)
            .await?;
        let start: SessionStart = response
            .json()
            .await
            .map_err(|e| DomainError::UploadError(format!("unexpected session response: {}", e)))?;
        Ok(start.session_id)
    }

    async fn append_session(&self, session: &UploadSession, chunk: Vec<u8>) -> Result<(), DomainError> {
        self.content_call("files/upload_session/append_v2", &Self::append_arg(session), chunk)
            .await?;
        Ok(())
    }

    async fn finish_session(
        &self,
        session: &UploadSession,
        last_chunk: Vec<u8>,
        commit: &CommitInfo,
    ) -> Result<StoredFile, DomainError> {
        let response = self
            .content_call(
                "files/upload_session/finish",
                &Self::finish_arg(session, commit),
                last_chunk,
            )
            .await?;
        let metadata: FileMetadata = response
            .json()
            .await
            .map_err(|e| DomainError::UploadError(format!("unexpected finish response: {}", e)))?;
        Ok(into_stored(metadata))
    }

    async fn exists(&self, path: &str) -> Result<bool, DomainError> {
        let response = self
            .rpc_call("files/get_metadata", &json!({ "path": path }))
            .await
            .map_err(|e| DomainError::UploadError(format!("metadata request failed: {}", e)))?;

        if response.status() == reqwest::StatusCode::CONFLICT {
            let body = response.text().await.unwrap_or_default();
            if error_summary(&body).starts_with("path/not_found") {
                return Ok(false);
            }
            return Err(DomainError::UploadError(format!(
                "files/get_metadata returned 409: {}",
                error_summary(&body)
            )));
        }

        ensure_success(response, "files/get_metadata", DomainError::UploadError).await?;
        Ok(true)
    }

    async fn create_shared_link(&self, path: &str) -> Result<String, DomainError> {
        let response = self
            .rpc_call(
                "sharing/create_shared_link_with_settings",
                &json!({ "path": path }),
            )
            .await
            .map_err(|e| DomainError::LinkError(format!("link request failed: {}", e)))?;

        if response.status() == reqwest::StatusCode::CONFLICT {
            let body = response.text().await.unwrap_or_default();
            if error_summary(&body).starts_with("shared_link_already_exists") {
                debug!(path, "Shared link already exists, listing it");
                return self.existing_link(path).await;
            }
            return Err(DomainError::LinkError(error_summary(&body)));
        }

        let response = ensure_success(
            response,
            "sharing/create_shared_link_with_settings",
            DomainError::LinkError,
        )
        .await?;
        let link: SharedLink = response
            .json()
            .await
            .map_err(|e| DomainError::LinkError(format!("unexpected link response: {}", e)))?;
        Ok(link.url)
    }
}

/// Builds Dropbox clients sharing one HTTP connection pool
#[derive(Clone)]
pub struct DropboxConnector {
    http: reqwest::Client,
    api_base: String,
    content_base: String,
}

impl DropboxConnector {
    pub fn new() -> Self {
        Self::with_endpoints(DEFAULT_API_BASE, DEFAULT_CONTENT_BASE)
    }

    pub fn with_endpoints(api_base: impl Into<String>, content_base: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.into(),
            content_base: content_base.into(),
        }
    }
}

impl Default for DropboxConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreConnector for DropboxConnector {
    fn connect(&self, credential: &str) -> Result<Arc<dyn StorePort>, DomainError> {
        let token = credential.trim();
        if token.is_empty() {
            return Err(DomainError::InputError("store credential is empty".to_string()));
        }
        Ok(Arc::new(DropboxStoreAdapter::with_endpoints(
            self.http.clone(),
            token,
            self.api_base.clone(),
            self.content_base.clone(),
        )))
    }
}
