//! Session error types.

use desk_client::ApiError;
use thiserror::Error;

/// Session error type.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Login failed; the message is the most specific one the server gave
    #[error("Login failed: {0}")]
    Login(String),

    /// An authenticated operation was attempted without a ready session
    #[error("Not logged in")]
    NotAuthenticated,

    /// Stop-impersonation without an active impersonation
    #[error("No impersonation in progress")]
    NotImpersonating,

    /// The server response was missing an expected field
    #[error("Malformed server response: {0}")]
    MalformedResponse(String),

    /// Invalid transition in the session state machine
    #[error("Invalid session state transition: {0}")]
    InvalidTransition(String),

    /// API error
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Result type alias using SessionError.
pub type SessionResult<T> = Result<T, SessionError>;
