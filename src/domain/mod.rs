// Domain layer - Segment algebra and job records

pub mod envelope;
pub mod errors;
pub mod graph;
pub mod model;
pub mod rules;
pub mod timestamp;
