//! Offline screening: local classification of a full nine-answer submission.

pub mod artifacts;
pub mod classifier;
pub mod pipeline;
pub mod router;
pub mod tokenizer;

pub use artifacts::ArtifactError;
pub use pipeline::{OfflineClassification, OfflinePipeline, PredictError};
pub use router::predict_router;
