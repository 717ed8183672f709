//! Session command - refresh and the forced-logout countdown.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, Subcommand};
use console::Style;
use lyceum_client::{CountdownOutcome, ExpiryCountdown};
use serde_json::json;
use tokio::sync::oneshot;

use super::Context;

/// Arguments for the session command.
#[derive(Args, Debug)]
pub struct SessionArgs {
    #[command(subcommand)]
    pub command: SessionCommand,
}

#[derive(Subcommand, Debug)]
pub enum SessionCommand {
    /// Exchange the refresh token for a new access token now
    Refresh,

    /// Start the logout countdown; press Enter to stay logged in
    Countdown {
        /// Seconds before logout (default: defaults.session-countdown)
        #[arg(long)]
        seconds: Option<u64>,
    },
}

/// Run the session command.
pub async fn run(args: SessionArgs, ctx: &Context) -> Result<()> {
    match args.command {
        SessionCommand::Refresh => cmd_refresh(ctx).await,
        SessionCommand::Countdown { seconds } => cmd_countdown(seconds, ctx).await,
    }
}

async fn cmd_refresh(ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    client.refresh_session().await?;

    if ctx.json_output {
        return ctx.print_json(&json!({ "refreshed": true }));
    }
    ctx.success("Session refreshed");
    Ok(())
}

async fn cmd_countdown(seconds: Option<u64>, ctx: &Context) -> Result<()> {
    let (client, resolved) = ctx.connect()?;
    let duration = seconds
        .map(Duration::from_secs)
        .unwrap_or(resolved.session_countdown);

    let countdown = ExpiryCountdown::with_duration(Arc::new(client), duration);
    countdown.open();

    if !ctx.json_output {
        let yellow = Style::new().yellow().bold();
        println!(
            "{} Your session is ending. You will be logged out in {} seconds.",
            yellow.apply_to("!"),
            duration.as_secs()
        );
        println!("Press Enter to stay logged in.");
    }

    let outcome = tokio::select! {
        outcome = countdown.wait() => outcome,
        Ok(()) = wait_for_enter() => match countdown.extend().await {
            Some(outcome) => outcome,
            None => countdown.wait().await,
        },
    };

    if ctx.json_output {
        return ctx.print_json(&json!({ "outcome": outcome_name(outcome) }));
    }
    match outcome {
        CountdownOutcome::Extended => ctx.success("Session extended"),
        CountdownOutcome::LoggedOut => println!("Logged out."),
        CountdownOutcome::Cancelled => println!("Countdown cancelled."),
    }
    Ok(())
}

fn outcome_name(outcome: CountdownOutcome) -> &'static str {
    match outcome {
        CountdownOutcome::Extended => "extended",
        CountdownOutcome::LoggedOut => "logged_out",
        CountdownOutcome::Cancelled => "cancelled",
    }
}

/// Resolves with `Ok` when a line is read from stdin, `Err` on EOF.
///
/// Uses a detached thread: a pending `spawn_blocking` read would hold up
/// runtime shutdown.
fn wait_for_enter() -> oneshot::Receiver<()> {
    let (tx, rx) = oneshot::channel();
    std::thread::spawn(move || {
        let mut line = String::new();
        if matches!(std::io::stdin().read_line(&mut line), Ok(n) if n > 0) {
            let _ = tx.send(());
        }
    });
    rx
}
