// Domain errors - Failure taxonomy for a cut-and-deliver job

use std::fmt;

/// Domain-specific error types
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Missing required field, or every cut segment failed to parse
    InputError(String),
    /// Duration or stream-type detection failed
    ProbeError(String),
    /// No keep-interval survives the inversion
    InversionEmpty(String),
    /// No keep-interval survives graph construction, or no track present
    GraphEmpty(String),
    /// External engine exited non-zero
    TranscodeError(String),
    /// A remote store call failed
    UploadError(String),
    /// Shared link creation failed (callers degrade to the raw path)
    LinkError(String),
    /// The rename probe loop ran out of attempts
    NameExhausted(String),
    /// Local workspace I/O failed
    FsFail(String),
}

impl DomainError {
    /// Short machine-friendly kind name, used in log fields
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::InputError(_) => "input",
            DomainError::ProbeError(_) => "probe",
            DomainError::InversionEmpty(_) => "inversion_empty",
            DomainError::GraphEmpty(_) => "graph_empty",
            DomainError::TranscodeError(_) => "transcode",
            DomainError::UploadError(_) => "upload",
            DomainError::LinkError(_) => "link",
            DomainError::NameExhausted(_) => "name_exhausted",
            DomainError::FsFail(_) => "fs",
        }
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::InputError(msg) => write!(f, "Invalid input: {}", msg),
            DomainError::ProbeError(msg) => write!(f, "Probe failed: {}", msg),
            DomainError::InversionEmpty(msg) => write!(f, "Nothing left to keep: {}", msg),
            DomainError::GraphEmpty(msg) => write!(f, "No content to emit: {}", msg),
            DomainError::TranscodeError(msg) => write!(f, "Transcode failed: {}", msg),
            DomainError::UploadError(msg) => write!(f, "Upload failed: {}", msg),
            DomainError::LinkError(msg) => write!(f, "Link creation failed: {}", msg),
            DomainError::NameExhausted(msg) => write!(f, "No free destination name: {}", msg),
            DomainError::FsFail(msg) => write!(f, "File system error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}
