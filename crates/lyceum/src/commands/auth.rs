//! Auth commands - login, logout, whoami.

use std::io::Write;

use anyhow::{Context as _, Result, bail};
use clap::Args;
use console::{Style, style};
use serde_json::{Value, json};

use super::Context;

/// Arguments for the login command.
#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email (prompted for when omitted)
    pub email: Option<String>,

    /// Password (prompted for when omitted)
    #[arg(long, env = "LYCEUM_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

/// Log in and store the session for the current context.
pub async fn login(args: LoginArgs, ctx: &Context) -> Result<()> {
    let (client, resolved) = ctx.connect()?;

    let email = match args.email {
        Some(email) => email,
        None => prompt("Email: ")?,
    };
    if email.is_empty() {
        bail!("an email address is required");
    }
    let password = match args.password {
        Some(password) => password,
        None => rpassword::prompt_password("Password: ").context("failed to read password")?,
    };

    let login = client.login(&email, &password).await?;

    if ctx.json_output {
        return ctx.print_json(&json!({
            "context": resolved.name,
            "user": login.user,
            "refreshable": login.refresh_token.is_some(),
        }));
    }

    ctx.success(format!(
        "Logged in to {} as {}",
        style(&resolved.name).cyan(),
        display_name(&login.user).unwrap_or(email.as_str())
    ));
    if login.refresh_token.is_none() {
        let dim = Style::new().dim();
        println!(
            "{}",
            dim.apply_to("The server did not issue a refresh token; you will need to log in again when this session ends.")
        );
    }
    Ok(())
}

/// Clear the stored session for the current context.
pub async fn logout(ctx: &Context) -> Result<()> {
    let (client, resolved) = ctx.connect()?;
    let was_logged_in = client.is_authenticated();
    client.logout();

    if ctx.json_output {
        return ctx.print_json(&json!({
            "context": resolved.name,
            "was_logged_in": was_logged_in,
        }));
    }

    if was_logged_in {
        ctx.success(format!("Logged out of {}", style(&resolved.name).cyan()));
    } else {
        println!("Not logged in to {}.", resolved.name);
    }
    Ok(())
}

/// Show the stored profile. Works offline.
pub async fn whoami(ctx: &Context) -> Result<()> {
    let (client, resolved) = ctx.connect()?;
    let user = client.current_user();
    let authenticated = client.is_authenticated();

    if ctx.json_output {
        return ctx.print_json(&json!({
            "context": resolved.name,
            "base_url": resolved.base_url,
            "authenticated": authenticated,
            "refreshable": client.token_store().get_refresh_token().is_some(),
            "user": user,
        }));
    }

    if !authenticated {
        println!("Not logged in to {}.", resolved.name);
        println!("Run `lyceum login` to sign in.");
        return Ok(());
    }

    let dim = Style::new().dim();
    let user = user.unwrap_or(Value::Null);
    println!(
        "{} {}",
        style(display_name(&user).unwrap_or("(unknown user)")).bold(),
        dim.apply_to(format!("@ {}", resolved.name))
    );
    for field in ["email", "role"] {
        if let Some(value) = user.get(field).and_then(Value::as_str) {
            println!("  {:<6} {}", field, value);
        }
    }
    if ctx.verbose {
        println!(
            "{}",
            dim.apply_to(format!("  session file: {}", resolved.token_file.display()))
        );
    }
    Ok(())
}

/// Best human-readable name in a profile blob.
fn display_name(user: &Value) -> Option<&str> {
    ["name", "username", "email"]
        .iter()
        .find_map(|key| user.get(*key).and_then(Value::as_str))
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    std::io::stdout().flush()?;
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}
