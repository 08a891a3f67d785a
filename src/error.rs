//! Error types for persistence, generation, and configuration.

use thiserror::Error;

/// Failures reading or writing the persisted document, or importing one.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("storage I/O failed for '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("document is missing required field '{field}'")]
    MissingField { field: &'static str },

    #[error("document root must be a JSON object")]
    NotAnObject,
}

/// Failures of a generation request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    #[error("a generation request is already in progress")]
    Busy,

    #[error("prompt is empty")]
    EmptyPrompt,

    #[error("generation service failed: {0}")]
    Transport(String),

    #[error("response is not valid JSON: {0}")]
    Parse(String),

    #[error("response violates the workflow schema: {reason}")]
    Schema { reason: String },

    #[error("generation worker disconnected")]
    Disconnected,
}

/// Failures loading an editor configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Error, Debug)]
pub enum EditorError {
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T, E = EditorError> = std::result::Result<T, E>;
