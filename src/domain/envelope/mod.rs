// Job envelope - Decoding of the job input record

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::errors::DomainError;
use crate::domain::model::TimeUnit;

/// Destination folder used when the job does not name one
pub const DEFAULT_DESTINATION_FOLDER: &str = "/processed_videos/";

/// The three accepted ways of passing the cut list.
///
/// Variants are tried in declaration order: a bare list, then an object
/// holding `cuts`, then an object holding `segments`. Segments stay as raw
/// JSON so one malformed entry does not reject the whole envelope.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CutEnvelope {
    List(Vec<Value>),
    Cuts { cuts: Vec<Value> },
    Segments { segments: Vec<Value> },
}

impl CutEnvelope {
    /// Raw segment values regardless of shape
    pub fn segments(&self) -> &[Value] {
        match self {
            CutEnvelope::List(list) => list,
            CutEnvelope::Cuts { cuts } => cuts,
            CutEnvelope::Segments { segments } => segments,
        }
    }

    /// Shape name, for logs
    pub fn shape(&self) -> &'static str {
        match self {
            CutEnvelope::List(_) => "list",
            CutEnvelope::Cuts { .. } => "cuts",
            CutEnvelope::Segments { .. } => "segments",
        }
    }
}

/// Decoded job input
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JobRequest {
    #[serde(alias = "source_url", alias = "sourceLocator")]
    pub video_url: String,
    pub cuts: CutEnvelope,
    #[serde(
        default = "default_destination_folder",
        alias = "destinationFolder",
        alias = "folder"
    )]
    pub destination_folder: String,
    #[serde(default, alias = "dropbox_token", alias = "access_token")]
    pub credential: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default, alias = "timeUnit")]
    pub time_unit: Option<TimeUnit>,
}

fn default_destination_folder() -> String {
    DEFAULT_DESTINATION_FOLDER.to_string()
}

impl JobRequest {
    /// Decode a job from JSON, accepting an optional `{"input": {...}}` wrapper
    pub fn from_value(value: Value) -> Result<Self, DomainError> {
        let body = match value {
            Value::Object(mut map) if map.contains_key("input") && !map.contains_key("video_url") => {
                map.remove("input").unwrap_or(Value::Null)
            }
            other => other,
        };

        if !body.is_object() {
            return Err(DomainError::InputError(
                "job input must be a JSON object".to_string(),
            ));
        }

        serde_json::from_value(body).map_err(|e| DomainError::InputError(e.to_string()))
    }

    /// Decode a job from JSON text
    pub fn from_json(text: &str) -> Result<Self, DomainError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| DomainError::InputError(e.to_string()))?;
        Self::from_value(value)
    }

    /// Credential, rejecting blank tokens
    pub fn require_credential(&self) -> Result<&str, DomainError> {
        match self.credential.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(DomainError::InputError(
                "missing required field 'credential'".to_string(),
            )),
        }
    }
}

/// Success envelope returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobReport {
    pub success: bool,
    pub destination_path: String,
    pub filename_used: String,
    pub download_url: String,
    pub output_size_mb: f64,
    pub segments_kept: usize,
    pub total_duration_kept: f64,
    pub chunks_uploaded: u32,
    pub media_type: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Either the full success envelope or the flat error envelope
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JobOutcome {
    Success(JobReport),
    Failure { error: String },
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Success(_))
    }
}

impl From<Result<JobReport, DomainError>> for JobOutcome {
    fn from(result: Result<JobReport, DomainError>) -> Self {
        match result {
            Ok(report) => JobOutcome::Success(report),
            Err(e) => JobOutcome::Failure {
                error: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_list_shape() {
        let job = JobRequest::from_value(json!({
            "video_url": "https://example.com/a.mp4",
            "cuts": [{"start": 1, "end": 2}],
            "credential": "tok"
        }))
        .unwrap();
        assert_eq!(job.cuts.shape(), "list");
        assert_eq!(job.cuts.segments().len(), 1);
        assert_eq!(job.destination_folder, DEFAULT_DESTINATION_FOLDER);
        assert_eq!(job.filename, None);
    }

    #[test]
    fn test_decode_nested_shapes() {
        let job = JobRequest::from_value(json!({
            "video_url": "u",
            "cuts": {"cuts": [{"start": 1, "end": 2}, {"start": 3, "end": 4}]}
        }))
        .unwrap();
        assert_eq!(job.cuts.shape(), "cuts");
        assert_eq!(job.cuts.segments().len(), 2);

        let job = JobRequest::from_value(json!({
            "video_url": "u",
            "cuts": {"segments": [{"start": 1, "end": 2}]}
        }))
        .unwrap();
        assert_eq!(job.cuts.shape(), "segments");
    }

    #[test]
    fn test_decode_wrapped_input_and_aliases() {
        let job = JobRequest::from_value(json!({
            "input": {
                "sourceLocator": "https://example.com/b.mp4",
                "cuts": [],
                "destinationFolder": "/out/",
                "dropbox_token": "secret",
                "filename": "final",
                "time_unit": "ms"
            }
        }))
        .unwrap();
        assert_eq!(job.video_url, "https://example.com/b.mp4");
        assert_eq!(job.destination_folder, "/out/");
        assert_eq!(job.require_credential().unwrap(), "secret");
        assert_eq!(job.filename.as_deref(), Some("final"));
        assert_eq!(job.time_unit, Some(TimeUnit::Milliseconds));
    }

    #[test]
    fn test_malformed_segment_does_not_reject_envelope() {
        let job = JobRequest::from_value(json!({
            "video_url": "u",
            "cuts": [{"start": "bad"}, 7, {"start": 1, "end": 2}]
        }))
        .unwrap();
        assert_eq!(job.cuts.segments().len(), 3);
    }

    #[test]
    fn test_missing_required_fields() {
        let missing_url = JobRequest::from_value(json!({"cuts": []}));
        assert!(matches!(missing_url, Err(DomainError::InputError(_))));

        let missing_cuts = JobRequest::from_value(json!({"video_url": "u"}));
        assert!(matches!(missing_cuts, Err(DomainError::InputError(_))));

        let wrong_shape = JobRequest::from_value(json!({"video_url": "u", "cuts": {"other": []}}));
        assert!(wrong_shape.is_err());

        let job = JobRequest::from_value(json!({"video_url": "u", "cuts": [], "credential": "  "}))
            .unwrap();
        assert!(job.require_credential().is_err());
    }

    #[test]
    fn test_outcome_serialization() {
        let failure: JobOutcome = Err(DomainError::TranscodeError("boom".to_string())).into();
        assert_eq!(
            serde_json::to_value(&failure).unwrap(),
            json!({"error": "Transcode failed: boom"})
        );

        let success = JobOutcome::Success(JobReport {
            success: true,
            destination_path: "/processed_videos/a.mp4".to_string(),
            filename_used: "a.mp4".to_string(),
            download_url: "https://link".to_string(),
            output_size_mb: 1.5,
            segments_kept: 2,
            total_duration_kept: 90.0,
            chunks_uploaded: 1,
            media_type: "video+audio".to_string(),
            warnings: vec![],
        });
        let value = serde_json::to_value(&success).unwrap();
        assert_eq!(value["success"], json!(true));
        assert_eq!(value["segments_kept"], json!(2));
        assert!(value.get("warnings").is_none());
    }
}
