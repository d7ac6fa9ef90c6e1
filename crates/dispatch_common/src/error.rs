//! Error types for the dispatch pipeline.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Training requires at least 2 distinct techs, found {0}")]
    DegenerateLabels(usize),

    #[error("Vectorizer is not fitted")]
    NotFitted,

    #[error("Empty vocabulary: corpus produced no usable terms")]
    EmptyVocabulary,

    #[error("Model artifact error: {0}")]
    Artifact(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DispatchError>;
