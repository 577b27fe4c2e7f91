//! Error types for LawAid
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for LawAid operations
///
/// Covers configuration loading, remote provider and embedding calls,
/// index persistence and session bookkeeping.
#[derive(Error, Debug)]
pub enum LawaidError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Provider-related errors (API calls, bad responses, etc.)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Embedding endpoint errors
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// The persisted index could not be read or parsed
    #[error("Failed to load index from {path}: {message}")]
    IndexLoad {
        /// Index directory that failed to load
        path: String,
        /// Underlying failure
        message: String,
    },

    /// The persisted index was built with a different embedding setup
    #[error("Index is incompatible with the configured embedder: {0}")]
    IndexIncompatible(String),

    /// Ingestion produced nothing to index
    #[error("Ingestion error: {0}")]
    Ingest(String),

    /// Missing credentials for provider
    #[error("Missing credentials for provider: {0}")]
    MissingCredentials(String),

    /// Authentication errors (e.g., 401 Unauthorized)
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// No session exists for the given id
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for LawAid operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = LawaidError::Config("invalid format".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid format");
    }

    #[test]
    fn test_provider_error_display() {
        let error = LawaidError::Provider("API timeout".to_string());
        assert_eq!(error.to_string(), "Provider error: API timeout");
    }

    #[test]
    fn test_embedding_error_display() {
        let error = LawaidError::Embedding("empty response".to_string());
        assert_eq!(error.to_string(), "Embedding error: empty response");
    }

    #[test]
    fn test_index_load_error_display() {
        let error = LawaidError::IndexLoad {
            path: "faiss_index".to_string(),
            message: "expected value at line 1".to_string(),
        };
        let s = error.to_string();
        assert!(s.contains("faiss_index"));
        assert!(s.contains("expected value"));
    }

    #[test]
    fn test_index_incompatible_display() {
        let error = LawaidError::IndexIncompatible("dimensions 768 != 384".to_string());
        assert_eq!(
            error.to_string(),
            "Index is incompatible with the configured embedder: dimensions 768 != 384"
        );
    }

    #[test]
    fn test_missing_credentials_error_display() {
        let error = LawaidError::MissingCredentials("together".to_string());
        assert_eq!(
            error.to_string(),
            "Missing credentials for provider: together"
        );
    }

    #[test]
    fn test_authentication_error_display() {
        let error = LawaidError::Authentication("invalid api key".to_string());
        assert_eq!(error.to_string(), "Authentication error: invalid api key");
    }

    #[test]
    fn test_session_not_found_display() {
        let error = LawaidError::SessionNotFound("abc".to_string());
        assert_eq!(error.to_string(), "Session not found: abc");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: LawaidError = io_error.into();
        assert!(matches!(error, LawaidError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let error: LawaidError = json_error.into();
        assert!(matches!(error, LawaidError::Serialization(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("invalid: : yaml").unwrap_err();
        let error: LawaidError = yaml_error.into();
        assert!(matches!(error, LawaidError::Yaml(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<LawaidError>();
    }
}
