//! Configuration for Lyceum clients.
//!
//! Client configuration is kubeconfig-style YAML:
//! - Named contexts, each pointing at one backend (`base-url`)
//! - `current-context` for default selection
//! - Per-context session file, so logging in to one backend does not
//!   disturb another

pub mod client;
pub mod discovery;
pub mod error;

pub use client::{
    ClientConfig, ClientDefaults, Context, DEFAULT_CONTEXT, ResolvedContext, client_config_path,
    load_client_config, load_client_config_from, save_client_config, save_client_config_to,
};
pub use discovery::{CONFIG_DIR_ENV, default_token_file, xdg_config_dir};
pub use error::{ConfigError, Result};
