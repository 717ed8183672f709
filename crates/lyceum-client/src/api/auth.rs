//! Auth API.

use serde_json::Value;

use crate::client::LyceumClient;
use crate::error::Result;
use crate::types::LoginResponse;

/// Auth API client.
pub struct AuthApi {
    client: LyceumClient,
}

impl AuthApi {
    pub(crate) fn new(client: LyceumClient) -> Self {
        Self { client }
    }

    /// Log in and store the session.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        self.client.login(email, password).await
    }

    /// Exchange the stored refresh token for a new access token.
    pub async fn refresh(&self) -> Result<()> {
        self.client.refresh_session().await
    }

    /// End the session on this device.
    pub fn logout(&self) {
        self.client.logout()
    }

    /// Profile stored at login, if logged in.
    pub fn current_user(&self) -> Option<Value> {
        self.client.current_user()
    }
}
