//! CLI command handlers.

use anyhow::Result;
use console::Style;
use lyceum_auth::create_token_store;
use lyceum_client::{LyceumClient, SessionEvents};
use lyceum_config::ResolvedContext;
use serde::Serialize;

pub mod announcements;
pub mod auth;
pub mod book;
pub mod config;
pub mod events;
pub mod gallery;
pub mod leaders;
pub mod session;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Base URL given on the command line or in the environment.
    pub base_url: Option<String>,
    /// Context name given on the command line or in the environment.
    pub context: Option<String>,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
    /// Session notifications from every client this run creates.
    pub events: SessionEvents,
}

impl Context {
    /// Work out which backend to talk to and where its session lives.
    pub fn resolve(&self) -> Result<ResolvedContext> {
        let config = lyceum_config::load_client_config()?;
        Ok(config.resolve(self.context.as_deref(), self.base_url.as_deref())?)
    }

    /// Build a client for the resolved context, backed by its session file.
    pub fn client(&self) -> Result<LyceumClient> {
        Ok(self.connect()?.0)
    }

    /// Like [`Context::client`], also returning the resolved settings.
    pub fn connect(&self) -> Result<(LyceumClient, ResolvedContext)> {
        let resolved = self.resolve()?;
        tracing::debug!(
            context = %resolved.name,
            base_url = %resolved.base_url,
            token_file = %resolved.token_file.display(),
            "Resolved context"
        );

        let store = create_token_store(&resolved.token_file);
        let client = LyceumClient::builder()
            .base_url(&resolved.base_url)
            .timeout(resolved.timeout)
            .token_store(store)
            .events(self.events.clone())
            .build()?;
        Ok((client, resolved))
    }

    /// Print a value as pretty JSON.
    pub fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    /// Print a success line, unless output is JSON.
    pub fn success(&self, message: impl std::fmt::Display) {
        if !self.json_output {
            println!("{} {}", Style::new().green().apply_to("✓"), message);
        }
    }
}

/// Print a bold heading with a rule under it.
pub fn heading(title: &str) {
    let dim = Style::new().dim();
    println!("{}", Style::new().bold().apply_to(title));
    println!("{}", dim.apply_to("─".repeat(50)));
}

/// Shorten `s` to at most `max_len` characters on one line.
pub fn truncate(s: &str, max_len: usize) -> String {
    let s = s.replace('\n', " ");
    if s.chars().count() <= max_len {
        s
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("line one\nline two", 100), "line one line two");
        assert_eq!(truncate("abcdefghij", 6), "abc...");
        // Counts characters, not bytes
        assert_eq!(truncate("ééééééé", 5), "éé...");
    }
}
