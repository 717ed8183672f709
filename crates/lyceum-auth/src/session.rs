//! Session data as persisted on the device.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Storage key for the access token.
pub const TOKEN_KEY: &str = "token";

/// Storage key for the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Storage key for the user profile.
pub const USER_KEY: &str = "user";

/// A freshly established session, as produced by a successful login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Opaque profile blob returned by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Value>,
}

impl Session {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            user: None,
        }
    }

    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    pub fn with_user(mut self, user: Value) -> Self {
        self.user = Some(user);
        self
    }
}

/// The three independently optional entries of the persisted store.
///
/// Serialized with the keys `token`, `refresh_token` and `user`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredAuth {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Value>,
}

impl StoredAuth {
    /// True when no entry is present.
    pub fn is_empty(&self) -> bool {
        self.token.is_none() && self.refresh_token.is_none() && self.user.is_none()
    }
}

impl From<Session> for StoredAuth {
    fn from(session: Session) -> Self {
        Self {
            token: Some(session.access_token),
            refresh_token: session.refresh_token,
            user: session.user,
        }
    }
}
