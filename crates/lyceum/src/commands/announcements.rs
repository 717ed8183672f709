//! Announcements command - post and manage notices.

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use console::{Style, style};
use lyceum_client::{Announcement, CreateAnnouncementRequest, UpdateAnnouncementRequest};

use super::{Context, heading, truncate};

/// Arguments for the announcements command.
#[derive(Args, Debug)]
pub struct AnnouncementsArgs {
    #[command(subcommand)]
    pub command: AnnouncementsCommand,
}

#[derive(Subcommand, Debug)]
pub enum AnnouncementsCommand {
    /// List announcements, pinned first
    List,

    /// Show one announcement
    Show {
        /// Announcement ID
        id: String,
    },

    /// Publish an announcement
    Post {
        /// Headline
        #[arg(long)]
        title: String,

        /// Body text
        #[arg(long)]
        body: String,

        /// Keep it at the top of the list
        #[arg(long)]
        pinned: bool,
    },

    /// Update an announcement
    Update {
        /// Announcement ID
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        body: Option<String>,

        /// Pin or unpin (true/false)
        #[arg(long)]
        pinned: Option<bool>,
    },

    /// Delete an announcement
    Remove {
        /// Announcement ID
        id: String,
    },
}

/// Run the announcements command.
pub async fn run(args: AnnouncementsArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let api = client.announcements();

    match args.command {
        AnnouncementsCommand::List => {
            let items = api.list().await?;
            if ctx.json_output {
                return ctx.print_json(&items);
            }

            heading("Announcements");
            if items.is_empty() {
                println!("{}", Style::new().dim().apply_to("No announcements"));
            }
            for item in &items {
                print_row(item);
            }
        }
        AnnouncementsCommand::Show { id } => {
            let item = api.get(&id).await?;
            if ctx.json_output {
                return ctx.print_json(&item);
            }
            heading(&item.title);
            if let Some(at) = item.published_at {
                let dim = Style::new().dim();
                println!("{}", dim.apply_to(at.format("%Y-%m-%d %H:%M").to_string()));
            }
            println!("{}", item.body);
        }
        AnnouncementsCommand::Post {
            title,
            body,
            pinned,
        } => {
            let item = api
                .create(CreateAnnouncementRequest {
                    title,
                    body,
                    pinned,
                })
                .await?;
            if ctx.json_output {
                return ctx.print_json(&item);
            }
            ctx.success(format!("Posted \"{}\"", item.title));
        }
        AnnouncementsCommand::Update {
            id,
            title,
            body,
            pinned,
        } => {
            if title.is_none() && body.is_none() && pinned.is_none() {
                bail!("nothing to update");
            }
            let item = api
                .update(&id, UpdateAnnouncementRequest { title, body, pinned })
                .await?;
            if ctx.json_output {
                return ctx.print_json(&item);
            }
            ctx.success(format!("Updated \"{}\"", item.title));
        }
        AnnouncementsCommand::Remove { id } => {
            api.delete(&id).await?;
            ctx.success(format!("Deleted announcement {}", id));
        }
    }

    Ok(())
}

fn print_row(item: &Announcement) {
    let marker = if item.pinned {
        style("*").yellow().bold().to_string()
    } else {
        " ".to_string()
    };
    let dim = Style::new().dim();
    println!(
        "{} {:<36} {}",
        marker,
        truncate(&item.title, 36),
        dim.apply_to(truncate(&item.body.replace('\n', " "), 50))
    );
}
