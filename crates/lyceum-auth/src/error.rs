//! Error types for session handling.

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors that can occur while managing a session.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Reading or writing the persisted session failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The persisted session could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The session could not be renewed.
    #[error("Renewal failed: {0}")]
    Renewal(String),
}

impl From<std::io::Error> for AuthError {
    fn from(e: std::io::Error) -> Self {
        AuthError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(e: serde_json::Error) -> Self {
        AuthError::Serialization(e.to_string())
    }
}
