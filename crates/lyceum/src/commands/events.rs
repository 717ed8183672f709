//! Events command - calendar management.

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use console::{Style, style};
use lyceum_client::{CalendarEvent, CreateEventRequest, ListEventsQuery, UpdateEventRequest};

use super::{Context, heading, truncate};

/// Arguments for the events command.
#[derive(Args, Debug)]
pub struct EventsArgs {
    #[command(subcommand)]
    pub command: EventsCommand,
}

#[derive(Subcommand, Debug)]
pub enum EventsCommand {
    /// List events
    List {
        /// Only events that have not started yet
        #[arg(long)]
        upcoming: bool,

        /// Maximum events to show
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show one event
    Show {
        /// Event ID
        id: String,
    },

    /// Create an event
    Add {
        /// Event title
        title: String,

        /// Start time, RFC 3339 (e.g. 2026-09-20T18:00:00Z)
        #[arg(long)]
        starts_at: DateTime<Utc>,

        /// End time, RFC 3339
        #[arg(long)]
        ends_at: Option<DateTime<Utc>>,

        /// Where it takes place
        #[arg(long)]
        location: Option<String>,

        /// Longer description
        #[arg(long)]
        description: Option<String>,
    },

    /// Update an event
    Update {
        /// Event ID
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        starts_at: Option<DateTime<Utc>>,

        #[arg(long)]
        ends_at: Option<DateTime<Utc>>,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },

    /// Delete an event
    Remove {
        /// Event ID
        id: String,
    },
}

/// Run the events command.
pub async fn run(args: EventsArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let api = client.calendar();

    match args.command {
        EventsCommand::List { upcoming, limit } => {
            let query = ListEventsQuery {
                upcoming: upcoming.then_some(true),
                limit,
            };
            let events = api.list_with_query(query).await?;
            if ctx.json_output {
                return ctx.print_json(&events);
            }

            heading(if upcoming { "Upcoming Events" } else { "Events" });
            if events.is_empty() {
                println!("{}", Style::new().dim().apply_to("No events found"));
            }
            for event in &events {
                print_row(event);
            }
        }
        EventsCommand::Show { id } => {
            let event = api.get(&id).await?;
            if ctx.json_output {
                return ctx.print_json(&event);
            }
            print_detail(&event);
        }
        EventsCommand::Add {
            title,
            starts_at,
            ends_at,
            location,
            description,
        } => {
            if let Some(ends_at) = ends_at
                && ends_at < starts_at
            {
                anyhow::bail!("--ends-at is before --starts-at");
            }
            let event = api
                .create(CreateEventRequest {
                    title,
                    description,
                    location,
                    starts_at,
                    ends_at,
                })
                .await?;
            if ctx.json_output {
                return ctx.print_json(&event);
            }
            ctx.success(format!("Created \"{}\" on {}", event.title, when(&event.starts_at)));
        }
        EventsCommand::Update {
            id,
            title,
            starts_at,
            ends_at,
            location,
            description,
        } => {
            let event = api
                .update(
                    &id,
                    UpdateEventRequest {
                        title,
                        description,
                        location,
                        starts_at,
                        ends_at,
                    },
                )
                .await?;
            if ctx.json_output {
                return ctx.print_json(&event);
            }
            ctx.success(format!("Updated \"{}\"", event.title));
        }
        EventsCommand::Remove { id } => {
            api.delete(&id).await?;
            ctx.success(format!("Deleted event {}", id));
        }
    }

    Ok(())
}

fn when(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

fn print_row(event: &CalendarEvent) {
    let dim = Style::new().dim();
    println!(
        "{}  {:<40} {}",
        style(when(&event.starts_at)).cyan(),
        truncate(&event.title, 40),
        dim.apply_to(event.location.as_deref().unwrap_or(""))
    );
}

fn print_detail(event: &CalendarEvent) {
    heading(&event.title);
    match event.ends_at {
        Some(ends_at) => println!("When:  {} – {}", when(&event.starts_at), when(&ends_at)),
        None => println!("When:  {}", when(&event.starts_at)),
    }
    if let Some(location) = &event.location {
        println!("Where: {}", location);
    }
    if let Some(description) = &event.description {
        println!();
        println!("{}", description);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_when_format() {
        let at: DateTime<Utc> = "2026-09-20T18:05:00Z".parse().unwrap();
        assert_eq!(when(&at), "2026-09-20 18:05");
    }
}
