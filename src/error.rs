//! Error kinds surfaced by the console backend.
//!
//! Every failure is returned to the immediate caller and shown to the user as
//! a blocking notice. Nothing here is retried. IPC commands flatten these into
//! their display text at the boundary.

use thiserror::Error;

/// Convenience alias used across the library.
pub type Result<T> = std::result::Result<T, ConsoleError>;

/// Why a stored credential could not be turned into claims.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("credential is empty")]
    Empty,
    #[error("credential is not a signed token (expected 3 segments, found {0})")]
    Segments(usize),
    #[error("token payload is not valid base64url: {0}")]
    Base64(String),
    #[error("token payload is not valid JSON: {0}")]
    Json(String),
    #[error("token payload is not a JSON object")]
    NotAnObject,
}

#[derive(Debug, Error)]
pub enum ConsoleError {
    /// A request needed a credential and the store had none.
    #[error("Not signed in: no stored credential")]
    AuthMissing,

    #[error("Invalid session token: {0}")]
    Decode(#[from] DecodeError),

    /// The backend answered with a non-success status.
    #[error("{message} (HTTP {status})")]
    Request { status: u16, message: String },

    /// A local precondition failed before any network call.
    #[error("{0}")]
    Validation(String),

    /// The request never produced an HTTP response.
    #[error("{0}")]
    Network(String),

    /// A success response whose body did not have the expected shape.
    #[error("Unexpected response from server: {0}")]
    Response(String),

    #[error("Credential storage error: {0}")]
    Storage(String),
}

impl ConsoleError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// HTTP status for `Request` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request { status, .. } => Some(*status),
            _ => None,
        }
    }
}
