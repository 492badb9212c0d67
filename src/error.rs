//! Error types for the application form engine.
//!
//! Validation failures are not errors: they are reported as
//! [`FieldErrors`](crate::form::FieldErrors) values. The types here cover
//! configuration, storage, and malformed update payloads.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Invalid update for section {section}: {reason}")]
    InvalidPatch { section: String, reason: String },
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Draft storage errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to open store: {0}")]
    Open(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
