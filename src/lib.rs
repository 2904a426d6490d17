//! segcut library
//!
//! Removes a set of time ranges from a media file, joins what remains into
//! one continuous output and delivers it to remote storage under a
//! collision-safe name.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use domain::envelope::{JobOutcome, JobReport, JobRequest};
pub use domain::errors::DomainError;
pub use domain::model::{Interval, MediaDescriptor, SegmentPlan};
pub use error::{SegcutError, SegcutResult};
