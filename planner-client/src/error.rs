//! Errors returned by every client-layer operation.

use shared::form::ValidationErrors;
use thiserror::Error;

/// Result alias used throughout the client layer.
pub type ClientResult<T> = Result<T, ClientError>;

/// Every way a client operation can fail.
///
/// Errors are `Clone` because the query cache hands the same failure to every
/// subscriber of a key.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// Input was rejected before any request was sent.
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationErrors),

    /// No response arrived.
    #[error("{}: {message}", transport_kind(.timeout))]
    Transport {
        /// Description from the transport.
        message: String,
        /// The request ran out of time rather than failing outright.
        timeout: bool,
    },

    /// The server answered with a non-success status other than 401/403.
    #[error("{message} (HTTP {status})")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Message taken from the response body.
        message: String,
    },

    /// The server rejected the credentials; the session has been cleared.
    #[error("session is no longer valid (HTTP {status}); sign in again")]
    Unauthorized {
        /// 401 or 403.
        status: u16,
    },

    /// A success response whose body did not match the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(String),

    /// Persisted session storage could not be read or written.
    #[error("session storage error: {0}")]
    Storage(String),

    /// The operation needs a signed-in user.
    #[error("not signed in")]
    NotAuthenticated,

    /// A query was read before it ever ran, because it is disabled until
    /// its inputs are available or its entry was cleared.
    #[error("nothing loaded yet: the query has not run")]
    NotFetched,
}

fn transport_kind(timeout: &bool) -> &'static str {
    if *timeout {
        "request timed out"
    } else {
        "network error"
    }
}

impl ClientError {
    /// A failure without a response.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            timeout: false,
        }
    }

    /// A request that exceeded its timeout.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            timeout: true,
        }
    }

    /// A non-success response other than 401/403.
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    /// A body that did not match the expected shape.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// A session storage failure.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// HTTP status carried by the error, if the server responded.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } | Self::Unauthorized { status } => Some(*status),
            _ => None,
        }
    }

    /// True for failures that mean the user must sign in again.
    #[must_use]
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Unauthorized { .. } | Self::NotAuthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            ClientError::server(404, "Trip not found").to_string(),
            "Trip not found (HTTP 404)"
        );
        assert_eq!(
            ClientError::timeout("after 30s").to_string(),
            "request timed out: after 30s"
        );
        assert_eq!(
            ClientError::transport("connection refused").to_string(),
            "network error: connection refused"
        );
    }

    #[test]
    fn test_status_and_auth() {
        assert_eq!(ClientError::Unauthorized { status: 403 }.status(), Some(403));
        assert_eq!(ClientError::decode("x").status(), None);
        assert!(ClientError::NotAuthenticated.is_auth());
        assert!(!ClientError::server(500, "boom").is_auth());
    }

    #[test]
    fn test_validation_from() {
        let err: ClientError = ValidationErrors::single("destination", "is required").into();
        assert!(err.to_string().contains("destination: is required"));
    }
}
