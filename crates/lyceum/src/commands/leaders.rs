//! Leaders command - leadership directory management.

use anyhow::Result;
use clap::{Args, Subcommand};
use console::{Style, style};
use lyceum_client::{CreateLeaderRequest, Leader, UpdateLeaderRequest};

use super::{Context, heading, truncate};

/// Arguments for the leaders command.
#[derive(Args, Debug)]
pub struct LeadersArgs {
    #[command(subcommand)]
    pub command: LeadersCommand,
}

/// Editable leader fields.
#[derive(Args, Debug, Default)]
pub struct LeaderFields {
    /// Short biography
    #[arg(long)]
    pub bio: Option<String>,

    /// Contact email
    #[arg(long)]
    pub email: Option<String>,

    /// Portrait URL
    #[arg(long)]
    pub photo_url: Option<String>,

    /// Position in the directory (lowest first)
    #[arg(long)]
    pub order: Option<i32>,
}

#[derive(Subcommand, Debug)]
pub enum LeadersCommand {
    /// List the directory
    List,

    /// Show one leader
    Show {
        /// Leader ID
        id: String,
    },

    /// Add a leader
    Add {
        /// Full name
        name: String,

        /// Office held, e.g. "President"
        #[arg(long)]
        position: String,

        #[command(flatten)]
        fields: LeaderFields,
    },

    /// Update a leader
    Update {
        /// Leader ID
        id: String,

        /// Full name
        #[arg(long)]
        name: Option<String>,

        /// Office held
        #[arg(long)]
        position: Option<String>,

        #[command(flatten)]
        fields: LeaderFields,
    },

    /// Remove a leader
    Remove {
        /// Leader ID
        id: String,
    },
}

/// Run the leaders command.
pub async fn run(args: LeadersArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let api = client.leaders();

    match args.command {
        LeadersCommand::List => {
            let leaders = api.list().await?;
            if ctx.json_output {
                return ctx.print_json(&leaders);
            }

            heading("Leaders");
            if leaders.is_empty() {
                println!("{}", Style::new().dim().apply_to("No leaders listed"));
            }
            for leader in &leaders {
                print_row(leader);
            }
        }
        LeadersCommand::Show { id } => {
            let leader = api.get(&id).await?;
            if ctx.json_output {
                return ctx.print_json(&leader);
            }
            print_detail(&leader);
        }
        LeadersCommand::Add {
            name,
            position,
            fields,
        } => {
            let leader = api
                .create(CreateLeaderRequest {
                    name,
                    position,
                    bio: fields.bio,
                    email: fields.email,
                    photo_url: fields.photo_url,
                    order: fields.order,
                })
                .await?;
            if ctx.json_output {
                return ctx.print_json(&leader);
            }
            ctx.success(format!("Added {} ({})", leader.name, dim_id(&leader.id)));
        }
        LeadersCommand::Update {
            id,
            name,
            position,
            fields,
        } => {
            let leader = api
                .update(
                    &id,
                    UpdateLeaderRequest {
                        name,
                        position,
                        bio: fields.bio,
                        email: fields.email,
                        photo_url: fields.photo_url,
                        order: fields.order,
                    },
                )
                .await?;
            if ctx.json_output {
                return ctx.print_json(&leader);
            }
            ctx.success(format!("Updated {}", leader.name));
        }
        LeadersCommand::Remove { id } => {
            api.delete(&id).await?;
            ctx.success(format!("Removed leader {}", dim_id(&id)));
        }
    }

    Ok(())
}

fn print_row(leader: &Leader) {
    println!(
        "{:<24} {:<28} {}",
        style(&leader.position).bold(),
        leader.name,
        dim_id(&leader.id)
    );
}

fn print_detail(leader: &Leader) {
    heading(&leader.name);
    println!("Position: {}", leader.position);
    if let Some(email) = &leader.email {
        println!("Email:    {}", email);
    }
    if let Some(photo) = &leader.photo_url {
        println!("Photo:    {}", photo);
    }
    if let Some(bio) = &leader.bio {
        println!();
        println!("{}", truncate(bio, 400));
    }
}

fn dim_id(id: &str) -> String {
    Style::new().dim().apply_to(id).to_string()
}
