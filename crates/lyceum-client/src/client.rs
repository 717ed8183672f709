//! Main client implementation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lyceum_auth::{
    AuthError, Session, SessionControl, SessionEvent, SessionEvents, SessionSubscription,
    SharedTokenStore, StoredAuth, create_memory_token_store,
};
use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use url::Url;

use crate::api::{AnnouncementsApi, AuthApi, BookApi, CalendarApi, GalleryApi, LeadersApi};
use crate::error::{Error, ErrorResponse, RefreshFailure, Result};
use crate::refresh::{RefreshGate, RefreshOutcome, Ticket, wait_for_leader};
use crate::request::{ApiRequest, FormPart, RequestBody, build_form};
use crate::types::{LoginRequest, LoginResponse, RefreshRequest, RefreshResponse};

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Path of the token refresh endpoint.
const REFRESH_PATH: &str = "auth/refresh";

/// Path of the login endpoint.
const LOGIN_PATH: &str = "api/user/login";

/// Lyceum API client.
///
/// Attaches the stored access token to every request. When the server
/// answers 401, the client refreshes the session once (no matter how many
/// requests failed at the same time) and replays each failed request with
/// the new token. If the refresh fails, the stored session is cleared and
/// [`SessionEvent::Expired`] is emitted.
///
/// # Example
///
/// ```no_run
/// use lyceum_client::LyceumClient;
///
/// # async fn example() -> lyceum_client::Result<()> {
/// let client = LyceumClient::builder()
///     .base_url("http://localhost:8080")
///     .build()?;
///
/// client.login("admin@example.org", "secret").await?;
/// let leaders = client.leaders().list().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LyceumClient {
    /// Inner shared state.
    inner: Arc<ClientInner>,
}

/// Inner client state (shared across clones).
struct ClientInner {
    /// HTTP client.
    http: reqwest::Client,
    /// Base URL for API requests.
    base_url: Url,
    /// Request timeout.
    timeout: Duration,
    /// Where the session lives.
    store: SharedTokenStore,
    /// Session lifecycle notifications.
    events: SessionEvents,
    /// Single-flight refresh coordination.
    refresh: RefreshGate,
}

impl LyceumClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// The token store backing this client.
    pub fn token_store(&self) -> &SharedTokenStore {
        &self.inner.store
    }

    /// Session lifecycle notifications emitted by this client.
    pub fn events(&self) -> &SessionEvents {
        &self.inner.events
    }

    /// Shorthand for `events().subscribe()`.
    pub fn subscribe(&self) -> SessionSubscription {
        self.inner.events.subscribe()
    }

    /// Whether an access token is currently stored.
    pub fn is_authenticated(&self) -> bool {
        self.inner.store.is_authenticated()
    }

    /// Profile of the logged-in user, as returned at login.
    pub fn current_user(&self) -> Option<serde_json::Value> {
        self.inner.store.get_user()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the auth API.
    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.clone())
    }

    /// Access the leaders API.
    pub fn leaders(&self) -> LeadersApi {
        LeadersApi::new(self.clone())
    }

    /// Access the calendar API.
    pub fn calendar(&self) -> CalendarApi {
        CalendarApi::new(self.clone())
    }

    /// Access the gallery API.
    pub fn gallery(&self) -> GalleryApi {
        GalleryApi::new(self.clone())
    }

    /// Access the announcements API.
    pub fn announcements(&self) -> AnnouncementsApi {
        AnnouncementsApi::new(self.clone())
    }

    /// Access the book-of-the-year API.
    pub fn book(&self) -> BookApi {
        BookApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Session lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Log in with email and password and store the resulting session.
    ///
    /// A 401 here means bad credentials and is returned as
    /// [`Error::Unauthorized`] without attempting a refresh.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let request = ApiRequest::post(LOGIN_PATH)
            .with_json(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })?
            .anonymous();
        let login: LoginResponse = self.send_json(request).await?;

        let mut session = Session::new(login.token.clone());
        if !login.user.is_null() {
            session = session.with_user(login.user.clone());
        }
        if let Some(refresh_token) = &login.refresh_token {
            session = session.with_refresh_token(refresh_token.clone());
        }
        self.inner.store.set_session(session);

        info!(refreshable = login.refresh_token.is_some(), "Logged in");
        Ok(login)
    }

    /// Refresh the session now, or wait for the refresh already running.
    pub async fn refresh_session(&self) -> Result<()> {
        let (outcome, _) = self.refresh_cycle().await;
        outcome.map(|_| ()).map_err(Error::RefreshFailed)
    }

    /// Clear the stored session and notify listeners.
    pub fn logout(&self) {
        self.inner.store.clear_auth();
        self.inner.events.emit(SessionEvent::LoggedOut);
        info!("Logged out");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Request pipeline
    // ─────────────────────────────────────────────────────────────────────────

    /// Send a request, refreshing the session once if it is rejected with 401.
    ///
    /// Returns the successful response. Error statuses other than 401 are
    /// returned as errors without any retry.
    pub async fn send(&self, request: ApiRequest) -> Result<reqwest::Response> {
        if request.is_anonymous() {
            let response = self.dispatch(&request, None).await?;
            return Self::check(response).await;
        }

        let token = self.inner.store.get_token();
        let response = self.dispatch(&request, token.as_deref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Self::check(response).await;
        }

        let rejected = Self::extract_error(response).await;
        let fresh = self.token_after_401(token.as_deref(), rejected).await?;

        debug!(path = %request.path, "Retrying with refreshed token");
        // A second 401 is returned as-is.
        let response = self.dispatch(&request, Some(&fresh)).await?;
        Self::check(response).await
    }

    /// Send a request and decode the JSON response.
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let response = self.send(request).await?;
        Ok(response.json().await?)
    }

    /// Make a GET request.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send_json(ApiRequest::get(path)).await
    }

    /// Make a GET request with query parameters.
    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.send_json(ApiRequest::get(path).with_query(query)?).await
    }

    /// Make a POST request.
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_json(ApiRequest::post(path).with_json(body)?).await
    }

    /// Make a PUT request.
    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_json(ApiRequest::put(path).with_json(body)?).await
    }

    /// Make a PATCH request.
    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_json(ApiRequest::patch(path).with_json(body)?).await
    }

    /// Make a DELETE request.
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.send(ApiRequest::delete(path)).await?;
        Ok(())
    }

    /// Make a multipart POST request.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        parts: Vec<FormPart>,
    ) -> Result<T> {
        self.send_json(ApiRequest::post(path).with_multipart(parts)).await
    }

    /// Build a URL for an API path.
    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        let path = path.trim_start_matches('/');
        self.inner.base_url.join(path).map_err(Error::from)
    }

    /// Send one attempt of a request with the given token.
    async fn dispatch(
        &self,
        request: &ApiRequest,
        token: Option<&str>,
    ) -> Result<reqwest::Response> {
        let url = self.url(&request.path)?;
        let mut builder = self
            .inner
            .http
            .request(request.method.clone(), url)
            .timeout(self.inner.timeout);

        if let Some(query) = &request.query {
            builder = builder.query(query);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(parts) => builder.multipart(build_form(parts)?),
        };

        debug!(
            method = %request.method,
            path = %request.path,
            authenticated = token.is_some(),
            "Sending request"
        );
        Ok(builder.send().await?)
    }

    /// Find a token to replay a request that was rejected with 401.
    ///
    /// `sent_with` is the token the rejected attempt carried and `rejected`
    /// is the error it produced.
    async fn token_after_401(&self, sent_with: Option<&str>, rejected: Error) -> Result<String> {
        let store = &self.inner.store;
        let ticket = self
            .inner
            .refresh
            .acquire_after_401(sent_with, || store.get_token());

        let (outcome, led) = self.run_ticket(ticket).await;
        outcome.map_err(|failure| match failure {
            RefreshFailure::MissingRefreshToken if led => rejected,
            failure => Error::RefreshFailed(failure),
        })
    }

    /// Run a refresh as leader, or queue behind the one in flight.
    ///
    /// The flag is true when this call performed the refresh itself.
    async fn refresh_cycle(&self) -> (RefreshOutcome, bool) {
        self.run_ticket(self.inner.refresh.acquire()).await
    }

    async fn run_ticket(&self, ticket: Ticket<'_>) -> (RefreshOutcome, bool) {
        match ticket {
            Ticket::Ready(token) => {
                debug!("Token changed since request was sent, replaying");
                (Ok(token), false)
            }
            Ticket::Leader(guard) => {
                let outcome = self.perform_refresh().await;
                guard.finish(&outcome);
                (outcome, true)
            }
            Ticket::Follower(rx) => (wait_for_leader(rx).await, false),
        }
    }

    async fn perform_refresh(&self) -> RefreshOutcome {
        let Some(refresh_token) = self.inner.store.get_refresh_token() else {
            warn!("Session rejected and no refresh token stored");
            self.expire_session();
            return Err(RefreshFailure::MissingRefreshToken);
        };

        let tokens = match self.request_refresh(&refresh_token).await {
            Ok(tokens) => tokens,
            Err(failure) => {
                warn!(error = %failure, "Token refresh failed, ending session");
                self.expire_session();
                return Err(failure);
            }
        };

        // Only apply the new tokens to the session they were issued for.
        let mut applied = false;
        self.inner.store.update(&mut |auth| {
            if auth.refresh_token.as_deref() == Some(refresh_token.as_str()) {
                auth.token = Some(tokens.access_token.clone());
                if let Some(rotated) = &tokens.refresh_token {
                    auth.refresh_token = Some(rotated.clone());
                }
                applied = true;
            }
        });
        if !applied {
            info!("Session changed during refresh, discarding new token");
            return Err(RefreshFailure::SessionChanged);
        }

        info!(rotated = tokens.refresh_token.is_some(), "Session refreshed");
        self.inner.events.emit(SessionEvent::Renewed);
        Ok(tokens.access_token)
    }

    async fn request_refresh(
        &self,
        refresh_token: &str,
    ) -> std::result::Result<RefreshResponse, RefreshFailure> {
        let url = self
            .url(REFRESH_PATH)
            .map_err(|e| RefreshFailure::Transport(e.to_string()))?;

        debug!("Requesting token refresh");
        let response = self
            .inner
            .http
            .post(url)
            .json(&RefreshRequest { refresh_token })
            .timeout(self.inner.timeout)
            .send()
            .await
            .map_err(|e| RefreshFailure::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RefreshFailure::Rejected {
                status: status.as_u16(),
                message: Self::error_message(response).await,
            });
        }

        response
            .json()
            .await
            .map_err(|e| RefreshFailure::InvalidResponse(e.to_string()))
    }

    /// Clear the store and emit `Expired` if there was anything to clear.
    fn expire_session(&self) {
        let mut had_session = false;
        self.inner.store.update(&mut |auth| {
            had_session = !auth.is_empty();
            *auth = StoredAuth::default();
        });
        if had_session {
            self.inner.events.emit(SessionEvent::Expired);
        }
    }

    /// Pass a successful response through, turn anything else into an error.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Self::extract_error(response).await)
        }
    }

    /// Extract an error from a failed response.
    async fn extract_error(response: reqwest::Response) -> Error {
        let status = response.status().as_u16();
        Error::from_status(status, Self::error_message(response).await)
    }

    async fn error_message(response: reqwest::Response) -> String {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(err) => err.message,
            Err(_) if !body.trim().is_empty() => body,
            Err(_) => format!("HTTP {}", status),
        }
    }
}

#[async_trait]
impl SessionControl for LyceumClient {
    async fn renew(&self) -> lyceum_auth::Result<()> {
        self.refresh_session()
            .await
            .map_err(|e| AuthError::Renewal(e.to_string()))
    }

    fn logout(&self) {
        LyceumClient::logout(self);
    }
}

/// Builder for creating a LyceumClient.
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: Option<String>,
    timeout: Duration,
    user_agent: Option<String>,
    store: Option<SharedTokenStore>,
    events: Option<SessionEvents>,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
            store: None,
            events: None,
        }
    }

    /// Set the base URL for the server.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Use this token store. Defaults to an in-memory store.
    pub fn token_store(mut self, store: SharedTokenStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Emit session events on an existing hub instead of a new one.
    pub fn events(mut self, events: SessionEvents) -> Self {
        self.events = Some(events);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<LyceumClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::Config("base_url is required".to_string()))?;

        // Parse and normalize base URL
        let mut base_url = Url::parse(&base_url)?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("lyceum-client/{}", env!("CARGO_PKG_VERSION")));

        let http = reqwest::Client::builder().user_agent(user_agent).build()?;

        Ok(LyceumClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                timeout: self.timeout,
                store: self.store.unwrap_or_else(create_memory_token_store),
                events: self.events.unwrap_or_default(),
                refresh: RefreshGate::new(),
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lyceum_auth::MemoryTokenStore;

    #[test]
    fn test_builder_requires_base_url() {
        let result = ClientBuilder::new().build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_builder_rejects_invalid_url() {
        let result = ClientBuilder::new().base_url("not a url").build();
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_builder_normalizes_trailing_slash() {
        let client = ClientBuilder::new()
            .base_url("http://localhost:8080/lyceum")
            .build()
            .unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:8080/lyceum/");

        let client = ClientBuilder::new()
            .base_url("http://localhost:8080/")
            .build()
            .unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:8080/");
    }

    #[test]
    fn test_url_building() {
        let client = ClientBuilder::new()
            .base_url("http://localhost:8080/lyceum")
            .build()
            .unwrap();

        let url = client.url("api/leaders").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/lyceum/api/leaders");

        let url = client.url("/auth/refresh").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/lyceum/auth/refresh");
    }

    #[test]
    fn test_shares_store_and_events() {
        let store: SharedTokenStore =
            Arc::new(MemoryTokenStore::with_session(Session::new("abc")));
        let events = SessionEvents::new();
        let mut sub = events.subscribe();

        let client = ClientBuilder::new()
            .base_url("http://localhost:8080")
            .token_store(store.clone())
            .events(events)
            .build()
            .unwrap();

        assert!(client.is_authenticated());
        client.logout();
        assert!(store.get_token().is_none());
        assert_eq!(sub.try_recv(), Some(SessionEvent::LoggedOut));
    }
}
