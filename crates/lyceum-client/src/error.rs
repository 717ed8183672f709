//! Client error types.

use thiserror::Error;

/// Why a token refresh did not produce a new access token.
///
/// Apart from [`RefreshFailure::Abandoned`] and
/// [`RefreshFailure::SessionChanged`], every variant ends the session: the
/// store is cleared and the session is reported as expired.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshFailure {
    /// No refresh token was stored.
    #[error("no refresh token available")]
    MissingRefreshToken,

    /// The refresh request never got a response.
    #[error("refresh request failed: {0}")]
    Transport(String),

    /// The refresh endpoint answered with a non-success status.
    #[error("refresh rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The refresh endpoint answered with a body we could not use.
    #[error("invalid refresh response: {0}")]
    InvalidResponse(String),

    /// The task driving the refresh went away before finishing.
    #[error("refresh abandoned before completion")]
    Abandoned,

    /// The session was cleared or replaced while the refresh was running,
    /// so its result was discarded.
    #[error("session changed during refresh")]
    SessionChanged,
}

/// Client error type.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server returned an error response.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from server.
        message: String,
    },

    /// The server rejected our credentials (401).
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed (403).
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found (404).
    #[error("Not found: {0}")]
    NotFound(String),

    /// The session could not be refreshed and has been cleared.
    #[error("Session refresh failed: {0}")]
    RefreshFailed(#[source] RefreshFailure),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Build an error from a non-success status and the server's message.
    pub(crate) fn from_status(status: u16, message: String) -> Self {
        match status {
            401 => Error::Unauthorized(message),
            403 => Error::Forbidden(message),
            404 => Error::NotFound(message),
            _ => Error::Api { status, message },
        }
    }

    /// HTTP status behind this error, if it came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Unauthorized(_) => Some(401),
            Error::Forbidden(_) => Some(403),
            Error::NotFound(_) => Some(404),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Check if the caller has to log in again.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Unauthorized(_) | Error::RefreshFailed(_))
    }

    /// Check if this is a server error.
    pub fn is_server_error(&self) -> bool {
        matches!(self.status(), Some(status) if status >= 500)
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error body returned by the backend. Field names vary between routes.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(alias = "error", alias = "detail")]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        assert!(matches!(
            Error::from_status(401, "expired".into()),
            Error::Unauthorized(_)
        ));
        assert!(matches!(
            Error::from_status(403, "nope".into()),
            Error::Forbidden(_)
        ));
        assert!(Error::from_status(404, "gone".into()).is_not_found());
        assert!(Error::from_status(503, "down".into()).is_server_error());
        assert_eq!(Error::from_status(422, "bad".into()).status(), Some(422));
    }

    #[test]
    fn test_auth_errors() {
        assert!(Error::Unauthorized("x".into()).is_auth_error());
        assert!(Error::RefreshFailed(RefreshFailure::MissingRefreshToken).is_auth_error());
        assert!(!Error::Forbidden("x".into()).is_auth_error());
    }

    #[test]
    fn test_error_response_aliases() {
        let a: ErrorResponse = serde_json::from_str(r#"{"message": "m"}"#).unwrap();
        let b: ErrorResponse = serde_json::from_str(r#"{"error": "e"}"#).unwrap();
        let c: ErrorResponse = serde_json::from_str(r#"{"detail": "d"}"#).unwrap();
        assert_eq!(a.message, "m");
        assert_eq!(b.message, "e");
        assert_eq!(c.message, "d");
    }
}
