//! Error types for the session client.
//!
//! # Design
//! Every client operation resolves to an `ApiOutcome`, so this enum is the
//! whole failure vocabulary a caller has to display. Service-reported
//! failures keep the server's message verbatim. Anything that prevents a
//! usable response from arriving (refused connection, timeout, a body that is
//! not JSON) is a transport failure. A missing session is caught locally
//! before any request is built.

use thiserror::Error;

/// Result of a client operation: the payload, or the reason it failed.
pub type ApiOutcome<T> = Result<T, ApiError>;

/// Failure of a client operation. `Display` is the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The service answered with `success: false`.
    #[error("{0}")]
    Application(String),

    /// The request never produced a readable response.
    #[error("Connection error: {0}")]
    Transport(String),

    /// `list_supporting_documents` was called with no session held.
    #[error("Please login first to get a session ID")]
    NoSession,
}

impl ApiError {
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }

    pub fn is_application(&self) -> bool {
        matches!(self, ApiError::Application(_))
    }
}
