use std::time::Duration;

use thiserror::Error;

use crate::protocol::ErrorCode;
use crate::types::ModelTask;

/// Failure of one model call.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model call timed out after {0:?}")]
    Timeout(Duration),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("connection closed by peer")]
    Closed,

    #[error("{} is not supported here", .0.as_str())]
    Unsupported(ModelTask),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("remote error ({code}): {message}")]
    Remote { code: ErrorCode, message: String },
}

impl ModelError {
    /// Whether the connection that produced this error should be dropped.
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            ModelError::Timeout(_)
                | ModelError::Io(_)
                | ModelError::Json(_)
                | ModelError::Protocol(_)
                | ModelError::Closed
        )
    }
}
