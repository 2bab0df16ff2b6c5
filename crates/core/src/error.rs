//! Error types for Companion.
//!
//! This module defines a unified error enum covering configuration, I/O,
//! provider, retrieval, generation, and prompt failures. Only `EmptyQuery`
//! is ever shown to a caller as an error; the chat pipeline converts every
//! other variant into conversational text.

use thiserror::Error;

/// Unified error type for Companion.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Completion provider errors (transport, status, decoding)
    #[error("LLM error: {0}")]
    Llm(String),

    /// Embedding provider errors
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Vector store unreachable or returned an error
    #[error("Retrieval unavailable: {0}")]
    RetrievalUnavailable(String),

    /// The completion provider produced no usable content
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The query was missing, empty, or whitespace only
    #[error("Query is required")]
    EmptyQuery,

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_message() {
        assert_eq!(AppError::EmptyQuery.to_string(), "Query is required");
    }

    #[test]
    fn test_from_serde_json() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let app: AppError = err.into();
        assert!(matches!(app, AppError::Serialization(_)));
    }

    #[test]
    fn test_from_io() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let app: AppError = err.into();
        assert!(app.to_string().starts_with("I/O error"));
    }
}
