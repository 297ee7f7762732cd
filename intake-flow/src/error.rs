//! Error types for intake-flow
//!
//! Defines module-specific error types using thiserror for clear error propagation.

use thiserror::Error;

/// Main error type for intake-flow
#[derive(Error, Debug)]
pub enum Error {
    /// Navigation targeted a question id that is not in the catalog
    #[error("Question not found: {0}")]
    QuestionNotFound(String),

    /// Input does not fit the question (wrong kind, bad option index)
    #[error("Invalid answer for {question}: {reason}")]
    InvalidAnswer { question: String, reason: String },

    /// Photo slot index outside the fixed capture step list
    #[error("Photo slot {0} out of range (0-4)")]
    SlotOutOfRange(usize),

    /// Camera, speech, or picker call failed
    #[error("Capability error: {0}")]
    Capability(String),

    /// Camera or gallery access refused
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Operation not allowed in the current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Survey catalog failed validation
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Errors from the shared library (config, IO)
    #[error(transparent)]
    Common(#[from] intake_common::Error),

    /// JSON (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience Result type using intake-flow Error
pub type Result<T> = std::result::Result<T, Error>;
