use thiserror::Error;

use fleetscope_types::ValidationError;

/// Longest backend error body kept for display
const MAX_BODY_CHARS: usize = 200;

/// Errors that can occur when talking to a backend
#[derive(Error, Debug)]
pub enum ApiError {
    /// Rejected locally; no request was sent
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("request timed out")]
    Timeout,

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Classify a reqwest error
    pub(crate) fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else if e.is_connect() {
            ApiError::Connection(e.to_string())
        } else if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Transport(e.to_string())
        }
    }

    pub(crate) fn status(status: u16, body: &str) -> Self {
        ApiError::Status {
            status,
            body: body.trim().chars().take(MAX_BODY_CHARS).collect(),
        }
    }

    /// True when the request was never sent
    pub fn is_validation(&self) -> bool {
        matches!(self, ApiError::Validation(_))
    }
}
