//! Data and pipeline error types

use thiserror::Error;

/// Errors raised while obtaining or parsing strain data.
///
/// The variants distinguish the failure classes a run can hit:
/// `Unavailable` is retryable (network/service), `NotFound` is a fatal
/// misconfiguration, `Format` means the file exists but cannot be parsed.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("strain data unavailable: {0}")]
    Unavailable(#[from] reqwest::Error),

    #[error("file not found: {0}")]
    NotFound(String),

    #[error("unknown event: {0}")]
    UnknownEvent(String),

    #[error("malformed series file {path}: {reason}")]
    Format { path: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the feature pipeline and classifiers.
///
/// These indicate an internal inconsistency (e.g. a test matrix whose column
/// count does not match the fitted transforms) and are always fatal.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("shape mismatch: expected {expected}, got {got} ({context})")]
    ShapeMismatch {
        expected: usize,
        got: usize,
        context: String,
    },

    #[error("empty input: {0}")]
    EmptyInput(String),

    #[error("pipeline not fitted: call fit before transform")]
    NotFitted,
}

/// Result alias for data operations
pub type DataResult<T> = Result<T, DataError>;

/// Result alias for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;
