// Application layer - Use case interactors

pub mod container;
pub mod job_interactor;
pub mod name_resolver;
pub mod uploader;

// Re-export interactors
pub use job_interactor::{CutPlan, JobInteractor, JobSettings};
pub use name_resolver::NameResolver;
pub use uploader::ChunkedUploader;
