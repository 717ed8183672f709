//! Session handling for Lyceum clients.
//!
//! # Components
//!
//! - [`session`]: the persisted session entries (`token`, `refresh_token`, `user`)
//! - [`token_store`]: synchronous token storage, in memory or on disk
//! - [`events`]: session lifecycle notifications for UI shells
//! - [`countdown`]: the forced-logout countdown with a single "extend" action

pub mod countdown;
pub mod error;
pub mod events;
pub mod session;
pub mod token_store;

pub use countdown::{CountdownOutcome, CountdownState, ExpiryCountdown, SessionControl};
pub use error::{AuthError, Result};
pub use events::{SessionEvent, SessionEvents, SessionSubscription};
pub use session::{Session, StoredAuth};
pub use token_store::{
    FileTokenStore, MemoryTokenStore, SharedTokenStore, TokenStore, create_memory_token_store,
    create_token_store,
};
