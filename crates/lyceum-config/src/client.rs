//! Client configuration for connecting to Lyceum backends.
//!
//! Implements a kubeconfig-style configuration with named contexts:
//!
//! ```yaml
//! api-version: v1
//! kind: ClientConfig
//!
//! current-context: prod
//!
//! contexts:
//!   - name: local
//!     base-url: http://localhost:5000
//!   - name: prod
//!     base-url: https://api.lyceum.example.org
//!     timeout: 60
//!     token-file: ~/.local/share/lyceum/prod.json
//!
//! defaults:
//!   timeout: 30
//!   session-countdown: 60
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::discovery::{default_token_file, xdg_config_dir};
use crate::{ConfigError, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Client Config
// ─────────────────────────────────────────────────────────────────────────────

/// API version for the client config file format.
pub const API_VERSION: &str = "v1";

/// Kind identifier for client config files.
pub const KIND: &str = "ClientConfig";

/// Context name used when none is selected.
pub const DEFAULT_CONTEXT: &str = "default";

/// Default config filename.
const CLIENT_CONFIG_FILE: &str = "client.yaml";

/// Root client configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClientConfig {
    /// API version (always "v1" currently).
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Config kind (always "ClientConfig").
    #[serde(default = "default_kind")]
    pub kind: String,

    /// Name of the current/default context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_context: Option<String>,

    /// Named backend contexts.
    #[serde(default)]
    pub contexts: Vec<Context>,

    /// Default settings applied to all contexts.
    #[serde(default)]
    pub defaults: ClientDefaults,
}

fn default_api_version() -> String {
    API_VERSION.to_string()
}

fn default_kind() -> String {
    KIND.to_string()
}

impl ClientConfig {
    /// Create an empty client config.
    pub fn new() -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            ..Default::default()
        }
    }

    /// Parse from a YAML string.
    pub fn from_yaml(yaml_str: &str) -> Result<Self> {
        serde_yaml::from_str(yaml_str).map_err(|e| ConfigError::ParseYaml(e.to_string()))
    }

    /// Serialize to a YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::ParseYaml(e.to_string()))
    }

    /// Get the current context, if set and valid.
    pub fn current(&self) -> Option<&Context> {
        self.current_context
            .as_ref()
            .and_then(|name| self.get_context(name))
    }

    /// Get a context by name.
    pub fn get_context(&self, name: &str) -> Option<&Context> {
        self.contexts.iter().find(|c| c.name == name)
    }

    /// Get a mutable context by name.
    pub fn get_context_mut(&mut self, name: &str) -> Option<&mut Context> {
        self.contexts.iter_mut().find(|c| c.name == name)
    }

    /// Add or update a context.
    pub fn set_context(&mut self, context: Context) {
        match self.contexts.iter_mut().find(|c| c.name == context.name) {
            Some(existing) => *existing = context,
            None => self.contexts.push(context),
        }
    }

    /// Remove a context by name.
    pub fn remove_context(&mut self, name: &str) -> Option<Context> {
        let pos = self.contexts.iter().position(|c| c.name == name)?;
        // If removing current context, clear it
        if self.current_context.as_deref() == Some(name) {
            self.current_context = None;
        }
        Some(self.contexts.remove(pos))
    }

    /// Set the current context by name.
    ///
    /// Returns an error if the context doesn't exist.
    pub fn use_context(&mut self, name: &str) -> Result<()> {
        if self.get_context(name).is_some() {
            self.current_context = Some(name.to_string());
            Ok(())
        } else {
            Err(ConfigError::ContextNotFound(name.to_string()))
        }
    }

    /// List all context names.
    pub fn context_names(&self) -> Vec<&str> {
        self.contexts.iter().map(|c| c.name.as_str()).collect()
    }

    /// Resolve the settings to connect with, using the XDG config directory
    /// for default session files.
    pub fn resolve(
        &self,
        context: Option<&str>,
        base_url_override: Option<&str>,
    ) -> Result<ResolvedContext> {
        let config_dir = xdg_config_dir().ok_or(ConfigError::NoConfigDir)?;
        self.resolve_in(&config_dir, context, base_url_override)
    }

    /// Resolve the settings to connect with.
    ///
    /// The context is `context` if given, else `current-context`, else
    /// [`DEFAULT_CONTEXT`]. An explicitly named context must exist unless
    /// `base_url_override` supplies the URL. The override always wins over
    /// the context's `base-url`.
    pub fn resolve_in(
        &self,
        config_dir: &Path,
        context: Option<&str>,
        base_url_override: Option<&str>,
    ) -> Result<ResolvedContext> {
        let name = context
            .or(self.current_context.as_deref())
            .unwrap_or(DEFAULT_CONTEXT);
        let found = self.get_context(name);

        if found.is_none() && context.is_some() && base_url_override.is_none() {
            return Err(ConfigError::ContextNotFound(name.to_string()));
        }

        let base_url = base_url_override
            .map(str::to_string)
            .or_else(|| found.map(|c| c.base_url.clone()))
            .ok_or_else(|| ConfigError::NoBaseUrl(name.to_string()))?;

        let timeout = found
            .and_then(|c| c.timeout)
            .unwrap_or(self.defaults.timeout);

        let token_file = found
            .and_then(|c| c.token_file.as_deref())
            .map(expand_path)
            .unwrap_or_else(|| default_token_file(config_dir, name));

        Ok(ResolvedContext {
            name: name.to_string(),
            base_url,
            timeout: Duration::from_secs(timeout),
            token_file,
            session_countdown: Duration::from_secs(self.defaults.session_countdown),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Context
// ─────────────────────────────────────────────────────────────────────────────

/// A named backend context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Context {
    /// Unique name for this context.
    pub name: String,

    /// Backend base URL (e.g., "http://localhost:5000").
    pub base_url: String,

    /// Request timeout override (seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Where to keep this context's session. `~/` is expanded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_file: Option<PathBuf>,
}

impl Context {
    /// Create a new context with just a name and base URL.
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            timeout: None,
            token_file: None,
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: u64) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the session file.
    pub fn with_token_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_file = Some(path.into());
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Defaults
// ─────────────────────────────────────────────────────────────────────────────

/// Default settings applied to all contexts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ClientDefaults {
    /// Default request timeout in seconds.
    pub timeout: u64,

    /// Seconds between the session-expiry notice and the forced logout.
    pub session_countdown: u64,
}

impl Default for ClientDefaults {
    fn default() -> Self {
        Self {
            timeout: 30,
            session_countdown: 60,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Resolved
// ─────────────────────────────────────────────────────────────────────────────

/// A context with defaults applied and overrides merged in.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedContext {
    pub name: String,
    pub base_url: String,
    pub timeout: Duration,
    pub token_file: PathBuf,
    pub session_countdown: Duration,
}

// ─────────────────────────────────────────────────────────────────────────────
// Loading / Saving
// ─────────────────────────────────────────────────────────────────────────────

/// Get the path to the client config file.
pub fn client_config_path() -> Option<PathBuf> {
    xdg_config_dir().map(|d| d.join(CLIENT_CONFIG_FILE))
}

/// Load the client configuration.
///
/// Returns a default config if the file doesn't exist.
pub fn load_client_config() -> Result<ClientConfig> {
    load_client_config_from(client_config_path().as_deref())
}

/// Load client config from a specific path.
pub fn load_client_config_from(path: Option<&Path>) -> Result<ClientConfig> {
    let Some(path) = path else {
        return Ok(ClientConfig::new());
    };

    if !path.exists() {
        return Ok(ClientConfig::new());
    }

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;

    ClientConfig::from_yaml(&contents)
}

/// Save the client configuration.
pub fn save_client_config(config: &ClientConfig) -> Result<()> {
    let path = client_config_path().ok_or(ConfigError::NoConfigDir)?;
    save_client_config_to(config, &path)
}

/// Save client config to a specific path.
pub fn save_client_config_to(config: &ClientConfig, path: &Path) -> Result<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::WriteFile {
            path: parent.display().to_string(),
            source: e,
        })?;
    }

    let contents = config.to_yaml()?;
    std::fs::write(path, contents).map_err(|e| ConfigError::WriteFile {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Expand ~ to home directory in paths.
fn expand_path(path: &Path) -> PathBuf {
    if let Some(rest) = path.to_str().and_then(|s| s.strip_prefix("~/"))
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_YAML: &str = r#"
api-version: v1
kind: ClientConfig
current-context: prod

contexts:
  - name: local
    base-url: http://localhost:5000

  - name: prod
    base-url: https://api.lyceum.example.org
    timeout: 60
    token-file: /var/lib/lyceum/prod.json

defaults:
  timeout: 20
  session-countdown: 90
"#;

    #[test]
    fn test_empty_config() {
        let config = ClientConfig::new();
        assert_eq!(config.api_version, API_VERSION);
        assert_eq!(config.kind, KIND);
        assert!(config.current_context.is_none());
        assert!(config.contexts.is_empty());
        assert_eq!(config.defaults.timeout, 30);
        assert_eq!(config.defaults.session_countdown, 60);
    }

    #[test]
    fn test_parse_full_yaml() {
        let config = ClientConfig::from_yaml(FULL_YAML).unwrap();

        assert_eq!(config.current_context.as_deref(), Some("prod"));
        assert_eq!(config.context_names(), vec!["local", "prod"]);

        let local = config.get_context("local").unwrap();
        assert_eq!(local.base_url, "http://localhost:5000");
        assert!(local.timeout.is_none());
        assert!(local.token_file.is_none());

        let prod = config.current().unwrap();
        assert_eq!(prod.timeout, Some(60));
        assert_eq!(
            prod.token_file.as_deref(),
            Some(Path::new("/var/lib/lyceum/prod.json"))
        );

        assert_eq!(config.defaults.timeout, 20);
        assert_eq!(config.defaults.session_countdown, 90);
    }

    #[test]
    fn test_invalid_yaml() {
        let err = ClientConfig::from_yaml("contexts: [ {name: x").unwrap_err();
        assert!(matches!(err, ConfigError::ParseYaml(_)));
    }

    #[test]
    fn test_resolve_current_context() {
        let config = ClientConfig::from_yaml(FULL_YAML).unwrap();
        let resolved = config.resolve_in(Path::new("/cfg"), None, None).unwrap();

        assert_eq!(resolved.name, "prod");
        assert_eq!(resolved.base_url, "https://api.lyceum.example.org");
        assert_eq!(resolved.timeout, Duration::from_secs(60));
        assert_eq!(resolved.token_file, PathBuf::from("/var/lib/lyceum/prod.json"));
        assert_eq!(resolved.session_countdown, Duration::from_secs(90));
    }

    #[test]
    fn test_resolve_named_context_applies_defaults() {
        let config = ClientConfig::from_yaml(FULL_YAML).unwrap();
        let resolved = config
            .resolve_in(Path::new("/cfg"), Some("local"), None)
            .unwrap();

        assert_eq!(resolved.base_url, "http://localhost:5000");
        assert_eq!(resolved.timeout, Duration::from_secs(20));
        assert_eq!(resolved.token_file, PathBuf::from("/cfg/sessions/local.json"));
    }

    #[test]
    fn test_resolve_override_wins() {
        let config = ClientConfig::from_yaml(FULL_YAML).unwrap();
        let resolved = config
            .resolve_in(Path::new("/cfg"), None, Some("http://staging:5000"))
            .unwrap();
        assert_eq!(resolved.name, "prod");
        assert_eq!(resolved.base_url, "http://staging:5000");

        // An unknown context is fine when the URL comes from elsewhere.
        let resolved = config
            .resolve_in(Path::new("/cfg"), Some("adhoc"), Some("http://adhoc"))
            .unwrap();
        assert_eq!(resolved.token_file, PathBuf::from("/cfg/sessions/adhoc.json"));
    }

    #[test]
    fn test_resolve_errors() {
        let config = ClientConfig::from_yaml(FULL_YAML).unwrap();
        let err = config
            .resolve_in(Path::new("/cfg"), Some("missing"), None)
            .unwrap_err();
        assert!(matches!(err, ConfigError::ContextNotFound(ref n) if n == "missing"));

        let err = ClientConfig::new()
            .resolve_in(Path::new("/cfg"), None, None)
            .unwrap_err();
        assert!(matches!(err, ConfigError::NoBaseUrl(ref n) if n == DEFAULT_CONTEXT));
    }

    #[test]
    fn test_set_and_remove_context() {
        let mut config = ClientConfig::new();
        config.set_context(Context::new("local", "http://localhost:5000"));
        config.set_context(Context::new("local", "http://localhost:9090").with_timeout(5));
        assert_eq!(config.contexts.len(), 1);
        assert_eq!(config.contexts[0].base_url, "http://localhost:9090");

        config.use_context("local").unwrap();
        assert!(matches!(
            config.use_context("nonexistent"),
            Err(ConfigError::ContextNotFound(_))
        ));

        // Removing the current context clears it
        let removed = config.remove_context("local").unwrap();
        assert_eq!(removed.timeout, Some(5));
        assert!(config.current_context.is_none());
        assert!(config.remove_context("local").is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("client.yaml");

        let mut config = ClientConfig::new();
        config.set_context(
            Context::new("prod", "https://api.lyceum.example.org").with_token_file("/tmp/p.json"),
        );
        config.use_context("prod").unwrap();
        save_client_config_to(&config, &path).unwrap();

        let loaded = load_client_config_from(Some(&path)).unwrap();
        assert_eq!(loaded.current_context.as_deref(), Some("prod"));
        assert_eq!(loaded.contexts, config.contexts);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_client_config_from(Some(&dir.path().join("nope.yaml"))).unwrap();
        assert!(config.contexts.is_empty());

        let config = load_client_config_from(None).unwrap();
        assert_eq!(config.kind, KIND);
    }

    #[test]
    fn test_expand_path() {
        let expanded = expand_path(Path::new("~/sessions/prod.json"));
        if dirs::home_dir().is_some() {
            assert!(!expanded.to_str().unwrap().starts_with("~/"));
        }

        let absolute = PathBuf::from("/absolute/path");
        assert_eq!(expand_path(&absolute), absolute);
    }
}
