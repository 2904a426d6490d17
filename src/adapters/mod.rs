// Adapters - External system implementations

pub mod exec_ffmpeg;
pub mod fetch_http;
pub mod probe_ffprobe;
pub mod store_dropbox;
pub mod store_memory;
pub mod tracing_log;

// Re-export adapters
pub use exec_ffmpeg::FFmpegAdapter;
pub use fetch_http::HttpFetchAdapter;
pub use probe_ffprobe::FFprobeAdapter;
pub use store_dropbox::{DropboxConnector, DropboxStoreAdapter};
pub use store_memory::{MemoryStoreAdapter, MemoryStoreConnector, StoreCall};
pub use tracing_log::TracingLogAdapter;
