//! Token storage for the access token, refresh token and user profile.
//!
//! The store is the only owner of session state. The HTTP client reads it
//! per request and writes it only through login, refresh and logout.
//! No expiry checking happens here; validity is decided by the server.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde_json::Value;

use crate::error::Result;
use crate::session::{Session, StoredAuth};

/// Default session file name within a data directory.
pub const SESSION_FILE: &str = "session.json";

// ============================================================================
// TokenStore Trait
// ============================================================================

/// Synchronous key-value storage for session entries.
///
/// Implementors provide [`load`](TokenStore::load) and
/// [`update`](TokenStore::update); every update must be applied as a single
/// step so that no partially written state is ever observable.
pub trait TokenStore: Send + Sync + std::fmt::Debug {
    /// Snapshot of all entries.
    fn load(&self) -> StoredAuth;

    /// Apply a mutation to the entries as one atomic step.
    fn update(&self, f: &mut dyn FnMut(&mut StoredAuth));

    fn get_token(&self) -> Option<String> {
        self.load().token
    }

    fn get_refresh_token(&self) -> Option<String> {
        self.load().refresh_token
    }

    fn get_user(&self) -> Option<Value> {
        self.load().user
    }

    /// Overwrite the access token only.
    fn set_token(&self, token: &str) {
        self.update(&mut |auth| auth.token = Some(token.to_string()));
    }

    /// Overwrite the refresh token only.
    fn set_refresh_token(&self, token: &str) {
        self.update(&mut |auth| auth.refresh_token = Some(token.to_string()));
    }

    /// Replace all entries with a new session.
    fn set_session(&self, session: Session) {
        let mut next = Some(StoredAuth::from(session));
        self.update(&mut |auth| {
            if let Some(next) = next.take() {
                *auth = next;
            }
        });
    }

    /// Remove the access token, refresh token and profile together.
    fn clear_auth(&self) {
        self.update(&mut |auth| *auth = StoredAuth::default());
    }

    fn is_authenticated(&self) -> bool {
        self.get_token().is_some()
    }
}

// ============================================================================
// MemoryTokenStore
// ============================================================================

/// In-process token store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: RwLock<StoredAuth>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            entries: RwLock::new(session.into()),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> StoredAuth {
        self.entries.read().clone()
    }

    fn update(&self, f: &mut dyn FnMut(&mut StoredAuth)) {
        let mut entries = self.entries.write();
        f(&mut *entries);
    }
}

// ============================================================================
// FileTokenStore
// ============================================================================

/// Token store persisted as a small JSON file.
///
/// The file is read once and cached. Writes replace the file through a
/// temporary sibling and a rename; clearing the session deletes it. I/O
/// failures are logged and the cached view stays authoritative for the
/// lifetime of the process.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    // `None` until the file has been read.
    cache: Mutex<Option<StoredAuth>>,
}

impl FileTokenStore {
    /// Create a store backed by `session.json` inside `data_dir`.
    pub fn new(data_dir: &Path) -> Self {
        Self::with_path(data_dir.join(SESSION_FILE))
    }

    /// Create a store backed by an explicit file path.
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            cache: Mutex::new(None),
        }
    }

    /// Get the session file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(path: &Path) -> Result<StoredAuth> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(StoredAuth::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_file(path: &Path, auth: &StoredAuth) -> Result<()> {
        if auth.is_empty() {
            return match std::fs::remove_file(path) {
                Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
                _ => Ok(()),
            };
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(auth)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    fn cached<'a>(&self, cache: &'a mut Option<StoredAuth>) -> &'a mut StoredAuth {
        cache.get_or_insert_with(|| {
            Self::read_file(&self.path).unwrap_or_else(|e| {
                tracing::warn!(path = %self.path.display(), error = %e, "Ignoring unreadable session file");
                StoredAuth::default()
            })
        })
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> StoredAuth {
        let mut cache = self.cache.lock();
        self.cached(&mut cache).clone()
    }

    fn update(&self, f: &mut dyn FnMut(&mut StoredAuth)) {
        let mut cache = self.cache.lock();
        let entries = self.cached(&mut cache);
        f(&mut *entries);

        if let Err(e) = Self::write_file(&self.path, entries) {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to persist session");
        }
    }
}

// ============================================================================
// Shared Token Store
// ============================================================================

/// Shared token store for use across async contexts.
pub type SharedTokenStore = Arc<dyn TokenStore>;

/// Create a shared token store backed by the session file at `path`.
pub fn create_token_store(path: impl Into<PathBuf>) -> SharedTokenStore {
    Arc::new(FileTokenStore::with_path(path.into()))
}

/// Create a shared in-memory token store.
pub fn create_memory_token_store() -> SharedTokenStore {
    Arc::new(MemoryTokenStore::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn full_session() -> Session {
        Session::new("access")
            .with_refresh_token("refresh")
            .with_user(serde_json::json!({"name": "Ada"}))
    }

    #[test]
    fn test_memory_store_starts_empty() {
        let store = MemoryTokenStore::new();
        assert!(store.get_token().is_none());
        assert!(store.get_refresh_token().is_none());
        assert!(store.get_user().is_none());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_set_token_leaves_other_entries() {
        let store = MemoryTokenStore::with_session(full_session());

        store.set_token("rotated");

        assert_eq!(store.get_token().as_deref(), Some("rotated"));
        assert_eq!(store.get_refresh_token().as_deref(), Some("refresh"));
        assert_eq!(store.get_user().unwrap()["name"], "Ada");
    }

    #[test]
    fn test_set_refresh_token_leaves_other_entries() {
        let store = MemoryTokenStore::with_session(full_session());

        store.set_refresh_token("rotated");

        assert_eq!(store.get_token().as_deref(), Some("access"));
        assert_eq!(store.get_refresh_token().as_deref(), Some("rotated"));
        assert_eq!(store.get_user().unwrap()["name"], "Ada");
    }

    #[test]
    fn test_clear_auth_removes_everything() {
        let store = MemoryTokenStore::with_session(full_session());
        store.clear_auth();
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let temp = tempdir().unwrap();

        let store = FileTokenStore::new(temp.path());
        store.set_session(full_session());
        assert!(store.path().exists());

        let reopened = FileTokenStore::new(temp.path());
        assert_eq!(reopened.get_token().as_deref(), Some("access"));
        assert_eq!(reopened.get_refresh_token().as_deref(), Some("refresh"));
        assert_eq!(reopened.get_user().unwrap()["name"], "Ada");
    }

    #[test]
    fn test_file_store_writes_storage_keys() {
        let temp = tempdir().unwrap();
        let store = FileTokenStore::new(temp.path());
        store.set_session(full_session());

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw["token"], "access");
        assert_eq!(raw["refresh_token"], "refresh");
        assert_eq!(raw["user"]["name"], "Ada");
    }

    #[test]
    fn test_file_store_clear_deletes_file() {
        let temp = tempdir().unwrap();
        let store = FileTokenStore::new(temp.path());
        store.set_session(full_session());

        store.clear_auth();

        assert!(!store.path().exists());
        assert!(!store.is_authenticated());
        assert!(FileTokenStore::new(temp.path()).load().is_empty());
    }

    #[test]
    fn test_shared_store_uses_given_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("sessions").join("prod.json");

        let store = create_token_store(&path);
        store.set_session(full_session());
        store.set_refresh_token("rotated");

        let reopened = FileTokenStore::with_path(path);
        assert_eq!(reopened.get_token().as_deref(), Some("access"));
        assert_eq!(reopened.get_refresh_token().as_deref(), Some("rotated"));
    }

    #[test]
    fn test_file_store_ignores_corrupt_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join(SESSION_FILE);
        std::fs::write(&path, "not json").unwrap();

        let store = FileTokenStore::with_path(path);
        assert!(store.get_token().is_none());

        store.set_token("fresh");
        assert_eq!(store.get_token().as_deref(), Some("fresh"));
    }
}
