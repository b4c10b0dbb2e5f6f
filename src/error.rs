//! Error types for the Nocturne engine

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur in the engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Health data access was denied")]
    AuthorizationDenied,

    #[error("No health data source is available: {0}")]
    DataUnavailable(String),

    #[error("Sleep data fetch failed: {0}")]
    FetchFailed(String),

    #[error("Unknown challenge id: {0}")]
    ChallengeNotFound(Uuid),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Date parse error: {0}")]
    DateParse(String),

    #[error("Unknown sleep stage: {0}")]
    UnknownStage(String),
}
