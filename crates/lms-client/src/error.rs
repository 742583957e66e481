//! Client error types.

use thiserror::Error;

/// A result type using `ClientError`.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Error type for client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a failure.
    #[error("{message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Machine-readable error kind, when the server sent one.
        code: Option<String>,
        /// Human-readable message.
        message: String,
    },

    /// No token is stored; log in first.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// A success response did not have the expected shape.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Credential storage could not be read or written.
    #[error("credential storage error: {0}")]
    Credentials(String),

    /// `get_first_available` was given nothing to try.
    #[error("no candidate paths given")]
    NoCandidates,
}

impl ClientError {
    /// True for a 404-style "not found" answer.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }

    /// The HTTP status of an API failure.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Credentials(err.to_string())
    }
}
