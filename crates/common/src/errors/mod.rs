//! Error types for the FabLore query engine
//!
//! Provides:
//! - Distinct error types for each collaborator boundary
//! - A recoverability classifier used by the degradation paths
//! - Conversions from transport and serialization errors
//!
//! Nothing in this taxonomy is meant to reach an end user: the query
//! boundary converts every failure into a valid answer payload.

use thiserror::Error;

/// Result type alias using EngineError
pub type Result<T> = std::result::Result<T, EngineError>;

/// Engine error types
#[derive(Error, Debug)]
pub enum EngineError {
    // Document store errors
    #[error("Collection query failed for '{collection}': {message}")]
    Store { collection: String, message: String },

    #[error("Malformed passage data: {message}")]
    MalformedPassage { message: String },

    // Generative backend errors
    #[error("Answer backend error: {message}")]
    Backend { message: String },

    #[error("Answer backend timed out after {timeout_ms}ms")]
    BackendTimeout { timeout_ms: u64 },

    #[error("No generative backend configured")]
    BackendUnavailable,

    // Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    // Transport & serialization
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },

    // Generic
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl EngineError {
    /// Whether the engine can degrade past this error without surfacing it.
    ///
    /// Store failures lose one collection's passages; backend failures fall
    /// back to extractive synthesis. Everything else is caught only at the
    /// top-level query boundary.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EngineError::Store { .. }
                | EngineError::Backend { .. }
                | EngineError::BackendTimeout { .. }
                | EngineError::BackendUnavailable
                | EngineError::HttpClient(_)
        )
    }

    /// Shorthand for a store failure on one collection
    pub fn store(collection: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::Store {
            collection: collection.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a backend failure
    pub fn backend(message: impl Into<String>) -> Self {
        EngineError::Backend {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = EngineError::store("patents", "connection refused");
        assert_eq!(
            err.to_string(),
            "Collection query failed for 'patents': connection refused"
        );
    }

    #[test]
    fn test_recoverable_classification() {
        assert!(EngineError::store("news_articles", "timeout").is_recoverable());
        assert!(EngineError::backend("quota exceeded").is_recoverable());
        assert!(EngineError::BackendTimeout { timeout_ms: 30_000 }.is_recoverable());
        assert!(EngineError::BackendUnavailable.is_recoverable());
    }

    #[test]
    fn test_unrecoverable_classification() {
        let err = EngineError::Configuration {
            message: "bad threshold".into(),
        };
        assert!(!err.is_recoverable());

        let err = EngineError::Internal {
            message: "poisoned state".into(),
        };
        assert!(!err.is_recoverable());
    }
}
