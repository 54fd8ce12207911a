//! Error types for the nxvalidate library.

use thiserror::Error;

/// Main error type for nxvalidate operations.
#[derive(Debug, Error)]
pub enum NexusError {
    /// A check failed while running under the fail-fast policy.
    #[error("Validation failed at '{location}': {message}")]
    Invalid { location: String, message: String },

    /// No validator is registered for an entry's `definition` value.
    #[error("Unknown application definition: {0}")]
    UnknownDefinition(String),

    /// A declarative definition is malformed.
    #[error("Schema error: {0}")]
    Schema(String),

    /// A lazily loaded field value could not be materialized.
    #[error("Failed to load '{path}': {message}")]
    Load { path: String, message: String },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for nxvalidate operations.
pub type Result<T> = std::result::Result<T, NexusError>;
