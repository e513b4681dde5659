//! Errors raised by the host itself rather than the worker.

use rmcp::model::{ErrorCode, ErrorData as McpError};

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// A tool argument could not be turned into a request.
    #[error("INVALID_REQUEST: {0}")]
    InvalidRequest(String),

    /// No shown notification matches the given id or tag.
    #[error("NOTIFICATION_NOT_FOUND: {0}")]
    NotificationNotFound(String),

    /// Tool output could not be encoded.
    #[error("OUTPUT_FAILED: {0}")]
    Output(String),
}

impl From<HostError> for McpError {
    fn from(err: HostError) -> Self {
        let code = match &err {
            HostError::InvalidRequest(_) => -32602,
            HostError::NotificationNotFound(_) => -32004,
            HostError::Output(_) => -32603,
        };

        McpError { code: ErrorCode(code), message: err.to_string().into(), data: None }
    }
}
