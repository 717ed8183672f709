//! Lyceum - admin CLI for the student association backend
//!
//! Main entry point for the Lyceum CLI.

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::Style;
use lyceum_client::{SessionEvent, SessionEvents};

mod commands;

use commands::{announcements, auth, book, config, events, gallery, leaders, session};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Lyceum - manage the association website from the command line
#[derive(Parser)]
#[command(name = "lyceum")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Backend base URL (overrides the context's base-url)
    #[arg(long, global = true, env = "LYCEUM_BASE_URL")]
    pub base_url: Option<String>,

    /// Context to use instead of the current one
    #[arg(long, global = true, env = "LYCEUM_CONTEXT")]
    pub context: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in to the backend
    Login(auth::LoginArgs),

    /// Forget the stored session
    Logout,

    /// Show who is logged in
    Whoami,

    /// Session maintenance
    Session(session::SessionArgs),

    /// Manage the leadership directory
    Leaders(leaders::LeadersArgs),

    /// Manage calendar events
    Events(events::EventsArgs),

    /// Manage gallery photos and videos
    Gallery(gallery::GalleryArgs),

    /// Manage announcements
    Announcements(announcements::AnnouncementsArgs),

    /// Show or change the book of the year
    Book(book::BookArgs),

    /// Configuration management
    Config(config::ConfigArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing: console (human-readable) + rotating JSON file
    let filter = if cli.verbose {
        "lyceum=debug,lyceum_client=debug,lyceum_auth=debug,lyceum_config=debug,info"
    } else {
        "lyceum=warn,lyceum_client=warn,lyceum_auth=warn,warn"
    };

    let log_dir = lyceum_config::xdg_config_dir()
        .map(|d| d.join("logs"))
        .unwrap_or_else(|| std::path::PathBuf::from("logs"));
    let file_appender = tracing_appender::rolling::daily(&log_dir, "lyceum.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "lyceum=trace,lyceum_client=trace,lyceum_auth=trace,lyceum_config=trace,info",
                )),
        )
        .init();

    // Create context for commands
    let ctx = commands::Context {
        base_url: cli.base_url,
        context: cli.context,
        json_output: cli.json,
        verbose: cli.verbose,
        events: SessionEvents::new(),
    };
    let mut session_events = ctx.events.subscribe();

    // Dispatch to command handlers
    let result = match cli.command {
        Commands::Login(args) => auth::login(args, &ctx).await,
        Commands::Logout => auth::logout(&ctx).await,
        Commands::Whoami => auth::whoami(&ctx).await,
        Commands::Session(args) => session::run(args, &ctx).await,
        Commands::Leaders(args) => leaders::run(args, &ctx).await,
        Commands::Events(args) => events::run(args, &ctx).await,
        Commands::Gallery(args) => gallery::run(args, &ctx).await,
        Commands::Announcements(args) => announcements::run(args, &ctx).await,
        Commands::Book(args) => book::run(args, &ctx).await,
        Commands::Config(args) => config::run(args, &ctx).await,
    };

    // However many requests saw it, tell the user once.
    if session_events.drain().contains(&SessionEvent::Expired) {
        eprintln!(
            "{} Your session has expired. Run `lyceum login` to sign in again.",
            Style::new().yellow().bold().apply_to("!")
        );
    }

    result
}
