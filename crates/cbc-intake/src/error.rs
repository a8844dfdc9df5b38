//! Error types for the intake form

use thiserror::Error;

/// Intake error type
#[derive(Error, Debug)]
pub enum IntakeError {
    /// A rule carries a pattern that does not compile
    #[error("invalid pattern for field {field}: {source}")]
    InvalidPattern {
        field: String,
        #[source]
        source: regex::Error,
    },

    /// Two rules share a field name
    #[error("duplicate rule for field: {0}")]
    DuplicateRule(String),

    /// Rule bounds are inverted
    #[error("invalid bounds for field {0}: min is greater than max")]
    InvalidBounds(String),

    /// Rule table could not be parsed
    #[error("rules error: {0}")]
    Rules(String),

    /// Draft storage failure
    #[error("storage error: {0}")]
    Storage(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for the intake crate
pub type Result<T> = std::result::Result<T, IntakeError>;
