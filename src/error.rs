//! Error types for the reposcore evaluation pipeline
//!
//! Every failure a pipeline invocation can produce is a variant of
//! [`ReposcoreError`]. Callers branch on [`ReposcoreError::kind`] rather than
//! on message text.

use crate::types::ScoreField;
use thiserror::Error;

/// Main error type for reposcore operations
#[derive(Error, Debug)]
pub enum ReposcoreError {
    /// The model backend could not be reached or answered unusably
    #[error("Model gateway unavailable: {0}")]
    GatewayUnavailable(String),

    /// Raw model text does not decode into an evaluation
    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    /// A sub-score lies outside 0..=25
    #[error("Score out of range: {field} = {value} (allowed 0..=25)")]
    ScoreOutOfRange { field: ScoreField, value: i64 },

    /// The evaluation summary is blank
    #[error("Evaluation summary is empty")]
    EmptySummary,

    /// The history store rejected or could not commit a write
    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    /// Caller supplied unusable input (e.g. empty content)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Lookup found nothing
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Coarse category of a [`ReposcoreError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    GatewayUnavailable,
    MalformedResponse,
    ScoreOutOfRange,
    EmptySummary,
    PersistenceFailure,
    InvalidInput,
    NotFound,
    Internal,
}

impl ErrorKind {
    /// Stable machine-readable code used on the HTTP surface
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::GatewayUnavailable => "GATEWAY_UNAVAILABLE",
            ErrorKind::MalformedResponse => "MALFORMED_RESPONSE",
            ErrorKind::ScoreOutOfRange => "SCORE_OUT_OF_RANGE",
            ErrorKind::EmptySummary => "EMPTY_SUMMARY",
            ErrorKind::PersistenceFailure => "PERSISTENCE_FAILURE",
            ErrorKind::InvalidInput => "INVALID_INPUT",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Internal => "INTERNAL_ERROR",
        }
    }
}

impl ReposcoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReposcoreError::GatewayUnavailable(_) => ErrorKind::GatewayUnavailable,
            ReposcoreError::MalformedResponse(_) => ErrorKind::MalformedResponse,
            ReposcoreError::ScoreOutOfRange { .. } => ErrorKind::ScoreOutOfRange,
            ReposcoreError::EmptySummary => ErrorKind::EmptySummary,
            ReposcoreError::PersistenceFailure(_) => ErrorKind::PersistenceFailure,
            ReposcoreError::InvalidInput(_) => ErrorKind::InvalidInput,
            ReposcoreError::NotFound(_) => ErrorKind::NotFound,
            ReposcoreError::Config(_)
            | ReposcoreError::Io(_)
            | ReposcoreError::Serialization(_) => ErrorKind::Internal,
        }
    }

    /// Whether resubmitting the same request later may succeed.
    ///
    /// Validation failures are deterministic for a given model answer, so
    /// only transport and storage failures qualify.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::GatewayUnavailable | ErrorKind::PersistenceFailure
        )
    }
}

/// Result type alias for reposcore operations
pub type Result<T> = std::result::Result<T, ReposcoreError>;

impl From<libsql::Error> for ReposcoreError {
    fn from(err: libsql::Error) -> Self {
        ReposcoreError::PersistenceFailure(err.to_string())
    }
}
