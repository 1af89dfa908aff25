//! Error types for the Avo Inspector agent
//!
//! Only construction can fail from a caller's point of view. Every other error
//! is produced and absorbed inside the agent (see the dispatcher).

use thiserror::Error;

/// Main error type for inspector operations
#[derive(Error, Debug)]
pub enum InspectorError {
    /// Configuration rejected at construction time
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Sampling rate outside of [0, 1]
    #[error("Invalid sampling rate: {0}")]
    InvalidSamplingRate(f64),

    /// Network or transport level failure, displayed verbatim
    #[error("{0}")]
    Transport(String),

    /// Endpoint answered with a non-success status
    #[error("Unexpected status: {0}")]
    UnexpectedStatus(u16),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Metrics registration error
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl InspectorError {
    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        InspectorError::InvalidConfig(msg.into())
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        InspectorError::Transport(msg.into())
    }
}

impl From<reqwest::Error> for InspectorError {
    fn from(err: reqwest::Error) -> Self {
        InspectorError::Transport(err.to_string())
    }
}

/// Result type alias for inspector operations
pub type Result<T> = std::result::Result<T, InspectorError>;
