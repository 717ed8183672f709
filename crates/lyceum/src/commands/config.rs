//! Config command - contexts and client configuration.

use std::path::PathBuf;

use anyhow::{Result, anyhow, bail};
use clap::{Args, Subcommand};
use console::Style;
use serde_json::json;

use lyceum_config::{self, Context as ClientContext};

use super::Context;

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the settings the next command would use
    Show,

    /// Show configuration file path
    Path,

    // ── Client Context Commands ──────────────────────────────────────────
    /// Show the current context name
    CurrentContext,

    /// List available contexts
    GetContexts,

    /// Switch to a different context
    UseContext {
        /// Context name to switch to
        name: String,
    },

    /// Create or update a context
    SetContext {
        /// Context name
        name: String,

        /// Backend URL (e.g., http://localhost:5000)
        #[arg(long)]
        base_url: Option<String>,

        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Where to keep this context's session
        #[arg(long)]
        token_file: Option<PathBuf>,
    },

    /// Delete a context
    DeleteContext {
        /// Context name to delete
        name: String,
    },
}

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => cmd_show(ctx),
        ConfigCommand::Path => cmd_path(),
        ConfigCommand::CurrentContext => cmd_current_context(),
        ConfigCommand::GetContexts => cmd_get_contexts(ctx),
        ConfigCommand::UseContext { name } => cmd_use_context(&name),
        ConfigCommand::SetContext {
            name,
            base_url,
            timeout,
            token_file,
        } => cmd_set_context(&name, base_url, timeout, token_file),
        ConfigCommand::DeleteContext { name } => cmd_delete_context(&name),
    }
}

fn cmd_show(ctx: &Context) -> Result<()> {
    let resolved = ctx.resolve()?;

    if ctx.json_output {
        return ctx.print_json(&json!({
            "context": resolved.name,
            "base_url": resolved.base_url,
            "timeout_secs": resolved.timeout.as_secs(),
            "token_file": resolved.token_file,
            "session_countdown_secs": resolved.session_countdown.as_secs(),
        }));
    }

    let dim = Style::new().dim();
    println!("{:<18} {}", dim.apply_to("context"), resolved.name);
    println!("{:<18} {}", dim.apply_to("base-url"), resolved.base_url);
    println!(
        "{:<18} {}s",
        dim.apply_to("timeout"),
        resolved.timeout.as_secs()
    );
    println!(
        "{:<18} {}",
        dim.apply_to("token-file"),
        resolved.token_file.display()
    );
    println!(
        "{:<18} {}s",
        dim.apply_to("session-countdown"),
        resolved.session_countdown.as_secs()
    );
    Ok(())
}

fn cmd_path() -> Result<()> {
    let path = lyceum_config::client_config_path()
        .ok_or_else(|| anyhow!("Could not determine config directory"))?;
    println!("{}", path.display());
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Client Context Commands
// ─────────────────────────────────────────────────────────────────────────────

fn cmd_current_context() -> Result<()> {
    let config = lyceum_config::load_client_config()?;

    match &config.current_context {
        Some(name) => {
            println!("{}", name);
        }
        None => {
            println!("No current context set. Use 'lyceum config use-context <name>' to set one.");
        }
    }

    Ok(())
}

fn cmd_get_contexts(ctx: &Context) -> Result<()> {
    let config = lyceum_config::load_client_config()?;

    if ctx.json_output {
        return ctx.print_json(&json!({
            "current_context": config.current_context,
            "contexts": config.contexts,
        }));
    }

    if config.contexts.is_empty() {
        println!("No contexts configured.");
        println!();
        println!("Create one with:");
        println!("  lyceum config set-context local --base-url=http://localhost:5000");
        return Ok(());
    }

    let current = config.current_context.as_deref();

    println!("CURRENT   NAME            BASE URL");
    for context in &config.contexts {
        let marker = if current == Some(context.name.as_str()) {
            "*"
        } else {
            " "
        };
        println!("{}         {:<15} {}", marker, context.name, context.base_url);
    }

    Ok(())
}

fn cmd_use_context(name: &str) -> Result<()> {
    let mut config = lyceum_config::load_client_config()?;

    config.use_context(name)?;
    lyceum_config::save_client_config(&config)?;

    println!("Switched to context \"{}\".", name);

    Ok(())
}

fn cmd_set_context(
    name: &str,
    base_url: Option<String>,
    timeout: Option<u64>,
    token_file: Option<PathBuf>,
) -> Result<()> {
    if let Some(url) = &base_url {
        validate_base_url(url)?;
    }

    let mut config = lyceum_config::load_client_config()?;

    match config.get_context_mut(name) {
        Some(existing) => {
            if let Some(url) = base_url {
                existing.base_url = url;
            }
            if let Some(t) = timeout {
                existing.timeout = Some(t);
            }
            if let Some(path) = token_file {
                existing.token_file = Some(path);
            }
            println!("Context \"{}\" modified.", name);
        }
        None => {
            let url = base_url
                .ok_or_else(|| anyhow!("--base-url is required when creating a new context"))?;

            let mut context = ClientContext::new(name, url);
            if let Some(t) = timeout {
                context = context.with_timeout(t);
            }
            if let Some(path) = token_file {
                context = context.with_token_file(path);
            }
            config.set_context(context);
            println!("Context \"{}\" created.", name);
        }
    }

    // The first context becomes current
    let first = config.current_context.is_none() && config.contexts.len() == 1;
    if first {
        config.current_context = Some(name.to_string());
    }

    lyceum_config::save_client_config(&config)?;
    if first {
        println!("Context \"{}\" set as current context.", name);
    }

    Ok(())
}

fn cmd_delete_context(name: &str) -> Result<()> {
    let mut config = lyceum_config::load_client_config()?;

    match config.remove_context(name) {
        Some(_) => {
            lyceum_config::save_client_config(&config)?;
            println!("Context \"{}\" deleted.", name);
            if config.current_context.is_none() {
                println!(
                    "Note: No current context. Use 'lyceum config use-context <name>' to set one."
                );
            }
        }
        None => {
            println!("Context \"{}\" not found.", name);
        }
    }

    Ok(())
}

/// Only absolute http(s) URLs can be joined with request paths.
fn validate_base_url(raw: &str) -> Result<()> {
    let url = url::Url::parse(raw).map_err(|e| anyhow!("invalid --base-url '{}': {}", raw, e))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("--base-url must be http or https, got '{}'", url.scheme());
    }
    Ok(())
}
