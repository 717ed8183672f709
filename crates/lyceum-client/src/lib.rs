//! HTTP client SDK for the Lyceum association backend.
//!
//! This crate provides a typed, authenticated client for the backend API.
//! Requests carry the stored bearer token; a 401 triggers a single shared
//! token refresh and a replay of every request that was rejected.
//!
//! # Example
//!
//! ```no_run
//! use lyceum_client::{LyceumClient, Result, SessionEvent};
//!
//! # async fn example() -> Result<()> {
//! let client = LyceumClient::builder()
//!     .base_url("https://lyceum.example.org")
//!     .build()?;
//!
//! // React to a session that can no longer be refreshed
//! let mut events = client.subscribe();
//! tokio::spawn(async move {
//!     while let Some(event) = events.recv().await {
//!         if event == SessionEvent::Expired {
//!             eprintln!("Session expired, please log in again");
//!         }
//!     }
//! });
//!
//! client.login("admin@example.org", "secret").await?;
//!
//! for leader in client.leaders().list().await? {
//!     println!("{}: {}", leader.position, leader.name);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # API Coverage
//!
//! - **Auth**: Login, refresh, logout
//! - **Leaders**: CRUD for the leadership directory
//! - **Calendar**: CRUD for events, upcoming filter
//! - **Gallery**: List, multipart upload, metadata update, delete
//! - **Announcements**: CRUD, pinned first
//! - **Book**: Featured book of the year

pub mod api;
pub mod client;
pub mod error;
mod refresh;
pub mod request;
pub mod types;

pub use client::{ClientBuilder, LyceumClient};
pub use error::{Error, RefreshFailure, Result};
pub use request::{ApiRequest, FormPart, RequestBody};
pub use types::*;

// Re-export API types that are commonly used with query methods
pub use api::{ListEventsQuery, ListGalleryQuery};

// Session types callers need alongside the client
pub use lyceum_auth::{
    CountdownOutcome, ExpiryCountdown, SessionEvent, SessionEvents, SessionSubscription,
    SharedTokenStore, TokenStore,
};
