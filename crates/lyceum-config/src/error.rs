//! Configuration error types.

/// Result type alias for config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur during configuration loading and resolution.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read a config file.
    #[error("failed to read config file '{path}': {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },

    /// Failed to write a config file.
    #[error("failed to write config file '{path}': {source}")]
    WriteFile {
        path: String,
        source: std::io::Error,
    },

    /// Failed to parse YAML.
    #[error("failed to parse YAML config: {0}")]
    ParseYaml(String),

    /// Context not found.
    #[error("context '{0}' not found")]
    ContextNotFound(String),

    /// Neither the context nor the command line gave a server URL.
    #[error(
        "no base URL for context '{0}'. Pass --base-url, set LYCEUM_BASE_URL, or run `lyceum config set-context`"
    )]
    NoBaseUrl(String),

    /// The platform has no config directory and none was given.
    #[error("could not determine config directory (set LYCEUM_CONFIG_DIR)")]
    NoConfigDir,
}
