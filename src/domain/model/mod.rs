// Domain models - Core types and data structures

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// Default minimum interval length, in seconds
pub const DEFAULT_TOLERANCE_SECS: f64 = 0.1;

/// Default artifact size above which uploads go through a session (4 MiB)
pub const DEFAULT_CHUNK_SIZE: u64 = 4 * 1024 * 1024;

/// Half-open time range `[start, end)` in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub start: f64,
    pub end: f64,
}

impl Interval {
    /// Create a new interval with validation
    pub fn new(start: f64, end: f64) -> Result<Self, DomainError> {
        if !start.is_finite() || !end.is_finite() {
            return Err(DomainError::InputError(format!(
                "Interval bounds must be finite (start={}, end={})",
                start, end
            )));
        }
        if start < 0.0 {
            return Err(DomainError::InputError(format!(
                "Interval start cannot be negative: {}",
                start
            )));
        }
        if end <= start {
            return Err(DomainError::InputError(format!(
                "Interval end ({}) must be greater than start ({})",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    /// Length in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Intersection with `[0, limit)`, if non-empty
    pub fn clamp_to(&self, limit: f64) -> Option<Interval> {
        let start = self.start.max(0.0);
        let end = self.end.min(limit);
        if end > start {
            Some(Interval { start, end })
        } else {
            None
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.3}s, {:.3}s)", self.start, self.end)
    }
}

/// Media track type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Video,
    Audio,
}

impl TrackKind {
    /// Stream specifier letter used by the engine (`v` / `a`)
    pub fn specifier(&self) -> &'static str {
        match self {
            TrackKind::Video => "v",
            TrackKind::Audio => "a",
        }
    }
}

/// What the probe found in the source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaDescriptor {
    pub has_video: bool,
    pub has_audio: bool,
    pub total_duration: f64,
}

impl MediaDescriptor {
    /// Create new media descriptor with validation
    pub fn new(has_video: bool, has_audio: bool, total_duration: f64) -> Result<Self, DomainError> {
        if !total_duration.is_finite() || total_duration <= 0.0 {
            return Err(DomainError::ProbeError(format!(
                "Total duration must be positive, got {}",
                total_duration
            )));
        }
        Ok(Self {
            has_video,
            has_audio,
            total_duration,
        })
    }

    /// Present tracks, video first
    pub fn tracks(&self) -> Vec<TrackKind> {
        let mut tracks = Vec::with_capacity(2);
        if self.has_video {
            tracks.push(TrackKind::Video);
        }
        if self.has_audio {
            tracks.push(TrackKind::Audio);
        }
        tracks
    }

    /// Summary reported back to the caller
    pub fn media_type(&self) -> &'static str {
        match (self.has_video, self.has_audio) {
            (true, true) => "video+audio",
            (true, false) => "video",
            (false, true) => "audio",
            (false, false) => "none",
        }
    }
}

/// Ordered keep-intervals handed to graph construction.
///
/// Sorted ascending, pairwise non-overlapping, every interval longer than
/// the tolerance it was built with.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SegmentPlan {
    intervals: Vec<Interval>,
}

impl SegmentPlan {
    /// Build a plan, checking ordering and minimum length
    pub fn new(intervals: Vec<Interval>, tolerance: f64) -> Result<Self, DomainError> {
        for pair in intervals.windows(2) {
            if pair[1].start < pair[0].end {
                return Err(DomainError::InputError(format!(
                    "Keep intervals overlap or are unordered: {} then {}",
                    pair[0], pair[1]
                )));
            }
        }
        if let Some(short) = intervals.iter().find(|i| i.duration() < tolerance) {
            return Err(DomainError::InputError(format!(
                "Keep interval {} is shorter than {}s",
                short, tolerance
            )));
        }
        Ok(Self { intervals })
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Sum of kept durations
    pub fn total_duration(&self) -> f64 {
        self.intervals.iter().map(Interval::duration).sum()
    }
}

/// Declared unit of raw cut boundaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeUnit {
    #[serde(alias = "s", alias = "sec", alias = "secs", alias = "second", rename = "seconds")]
    Seconds,
    #[serde(alias = "ms", alias = "millis", alias = "millisecond", rename = "milliseconds")]
    Milliseconds,
}

impl TimeUnit {
    /// Convert a value expressed in this unit to seconds
    pub fn to_seconds(&self, value: f64) -> f64 {
        match self {
            TimeUnit::Seconds => value,
            TimeUnit::Milliseconds => value / 1000.0,
        }
    }
}

/// In-progress multi-chunk upload
#[derive(Debug, Clone, PartialEq)]
pub struct UploadSession {
    pub session_id: String,
    /// Bytes acknowledged by the store so far
    pub offset: u64,
    pub chunk_size: u64,
}

impl UploadSession {
    pub fn new(session_id: String, offset: u64, chunk_size: u64) -> Self {
        Self {
            session_id,
            offset,
            chunk_size,
        }
    }

    /// Record an acknowledged chunk
    pub fn advance(&mut self, written: u64) {
        self.offset += written;
    }
}

/// Resolved destination inside the remote store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationName {
    /// Always starts and ends with `/`
    pub folder: String,
    pub file_name: String,
}

impl DestinationName {
    pub fn new(folder: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            file_name: file_name.into(),
        }
    }

    /// Full store path
    pub fn path(&self) -> String {
        format!("{}{}", self.folder, self.file_name)
    }
}

impl fmt::Display for DestinationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// Metadata the store reports for a committed file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub path_display: String,
    pub name: String,
}

/// Outcome of a complete upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    /// Authoritative final path (may differ from the requested one)
    pub path_display: String,
    pub name: String,
    pub chunks_uploaded: u32,
}

#[cfg(test)]
mod tests;
