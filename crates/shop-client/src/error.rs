//! Client errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// No token pair is stored
    #[error("Not signed in")]
    NotSignedIn,

    /// Refresh was refused; stored tokens are gone and the user must sign in again
    #[error("Session expired, sign in again")]
    SessionExpired,

    /// Error envelope returned by the gateway
    #[error("{message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ClientError {
    /// HTTP status of an error envelope
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Error code of an error envelope
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => Some(code),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// The server refused the credentials outright (as opposed to being unreachable)
    pub fn is_rejection(&self) -> bool {
        matches!(self.status(), Some(400..=499))
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
