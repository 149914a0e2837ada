//! SDK error types.

use thiserror::Error;

/// Errors surfaced by the SDK.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// Non-2xx answer from the service. The body is embedded verbatim.
    #[error("SocketBus Error {body}")]
    Service { status: u16, body: String },

    /// Network-level failure: no response was received.
    #[error("SocketBus transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Crypto error: {0}")]
    Crypto(String),
}

impl AppError {
    /// HTTP status of a service error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Service { status, .. } => Some(*status),
            AppError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
