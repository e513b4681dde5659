//! Unified error types for pwakit.
//!
//! The display prefixes double as stable error codes for hosts.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

/// Unified error types for the pwakit engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., an unparsable request URL).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// One or more routes failed to compile.
    #[error("ROUTE_ERROR: {}", format_route_errors(.0))]
    InvalidRoutes(Vec<RouteError>),

    /// Network request failed before producing a response.
    #[error("NETWORK_ERROR: {0}")]
    Network(String),

    /// Network request did not settle in time.
    #[error("NETWORK_TIMEOUT: {0}")]
    NetworkTimeout(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// A stored entry could not be decoded back into a response.
    #[error("CACHE_ERROR: corrupt entry: {0}")]
    CorruptEntry(String),

    /// No store with this name is known to the program.
    #[error("UNKNOWN_CACHE: {0}")]
    UnknownCache(String),

    /// Precache install failed; nothing was persisted.
    #[error("INSTALL_FAILED: {0}")]
    InstallFailed(String),

    /// The worker is not in a state that accepts this event.
    #[error("INVALID_STATE: {0}")]
    InvalidState(String),

    /// Program text could not be read or written.
    #[error("PROGRAM_ERROR: {0}")]
    Program(String),

    /// Notification host rejected an operation.
    #[error("NOTIFICATION_ERROR: {0}")]
    Notification(String),

    /// Filesystem error while resolving or emitting artifacts.
    #[error("IO_ERROR: {0}")]
    Io(#[from] std::io::Error),
}

/// A route that failed to compile, reported with its position and pattern.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("route #{index} `{pattern}`: {reason}")]
pub struct RouteError {
    pub index: usize,
    pub pattern: String,
    pub reason: String,
}

fn format_route_errors(errors: &[RouteError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

impl Error {
    /// Whether this error came from the network side of an exchange.
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Network(_) | Error::NetworkTimeout(_))
    }

}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::InvalidInput(_) => -32602,
            Error::InvalidRoutes(_) => -32000,
            Error::Network(_) => -32008,
            Error::NetworkTimeout(_) => -32006,
            Error::Database(_) | Error::MigrationFailed(_) | Error::CorruptEntry(_) => -32002,
            Error::UnknownCache(_) => -32001,
            Error::InstallFailed(_) => -32013,
            Error::InvalidState(_) => -32014,
            Error::Program(_) | Error::Io(_) => -32015,
            Error::Notification(_) => -32016,
        };

        McpError { code: ErrorCode(code), message: err.to_string().into(), data: None }
    }
}
