//! Config directory discovery.

use std::path::PathBuf;

/// Application name for XDG directory resolution.
const APP_NAME: &str = "lyceum";

/// Environment variable to override the config directory.
///
/// When set, this takes precedence over the platform default (XDG/Application Support).
/// Useful for testing and for keeping several sets of sessions apart.
pub const CONFIG_DIR_ENV: &str = "LYCEUM_CONFIG_DIR";

/// Directory holding one session file per context.
const SESSIONS_DIR: &str = "sessions";

/// Get the XDG config directory for lyceum.
///
/// Checks `LYCEUM_CONFIG_DIR` first, then falls back to the platform default
/// (`~/.config/lyceum` on Linux, `~/Library/Application Support/lyceum` on macOS).
pub fn xdg_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV)
        && !dir.is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Default session file for a context, under `config_dir`.
pub fn default_token_file(config_dir: &std::path::Path, context: &str) -> PathBuf {
    config_dir.join(SESSIONS_DIR).join(format!("{}.json", context))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_default_token_file() {
        let path = default_token_file(Path::new("/etc/lyceum"), "prod");
        assert_eq!(path, PathBuf::from("/etc/lyceum/sessions/prod.json"));
    }
}
