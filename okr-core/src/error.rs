//! Error types for the OKR core.

use std::fmt;

use thiserror::Error;
use uuid::Uuid;

/// A specialized `Result` type for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The three record kinds of the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Objective,
    KeyResult,
    Initiative,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Objective => "Objective",
            Self::KeyResult => "Key result",
            Self::Initiative => "Initiative",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum Error {
    /// A referenced objective, key result or initiative does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: RecordKind, id: Uuid },

    /// A create or update was rejected before reaching the store.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The text-generation provider is unreachable or not configured.
    #[error("AI provider error: {0}")]
    AiProvider(String),

    /// The provider answered, but not with the expected structure.
    #[error("Malformed AI response: {0}")]
    MalformedAiResponse(String),

    /// The storage engine failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl Error {
    pub fn not_found(kind: RecordKind, id: Uuid) -> Self {
        Self::NotFound { kind, id }
    }

    /// Short machine-readable name of the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Validation(_) => "validation_failure",
            Self::AiProvider(_) => "ai_provider_error",
            Self::MalformedAiResponse(_) => "malformed_ai_response",
            Self::Storage(_) => "storage_error",
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        Self::Storage(e.to_string())
    }
}
