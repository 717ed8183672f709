//! Book command - the featured book of the year.

use anyhow::Result;
use clap::{Args, Subcommand};
use console::{Style, style};
use lyceum_client::Book;

use super::{Context, heading};

/// Arguments for the book command.
#[derive(Args, Debug)]
pub struct BookArgs {
    #[command(subcommand)]
    pub command: BookCommand,
}

#[derive(Subcommand, Debug)]
pub enum BookCommand {
    /// Show the featured book
    Show,

    /// Replace the featured book
    Set {
        /// Book title
        #[arg(long)]
        title: String,

        /// Author
        #[arg(long)]
        author: String,

        /// Publication year
        #[arg(long)]
        year: Option<i32>,

        /// Short description
        #[arg(long)]
        description: Option<String>,

        /// Cover image URL
        #[arg(long)]
        cover_url: Option<String>,

        /// Where to read or buy it
        #[arg(long)]
        link: Option<String>,
    },
}

/// Run the book command.
pub async fn run(args: BookArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let api = client.book();

    match args.command {
        BookCommand::Show => {
            let book = api.get().await?;
            if ctx.json_output {
                return ctx.print_json(&book);
            }
            match book {
                Some(book) => print_book(&book),
                None => println!("{}", Style::new().dim().apply_to("No book chosen yet")),
            }
        }
        BookCommand::Set {
            title,
            author,
            year,
            description,
            cover_url,
            link,
        } => {
            let book = api
                .set(&Book {
                    title,
                    author,
                    year,
                    description,
                    cover_url,
                    link,
                })
                .await?;
            if ctx.json_output {
                return ctx.print_json(&book);
            }
            ctx.success(format!("Featured book is now \"{}\"", book.title));
        }
    }

    Ok(())
}

fn print_book(book: &Book) {
    heading("Book of the Year");
    match book.year {
        Some(year) => println!("{} ({})", style(&book.title).bold(), year),
        None => println!("{}", style(&book.title).bold()),
    }
    println!("by {}", book.author);
    if let Some(description) = &book.description {
        println!();
        println!("{}", description);
    }
    if let Some(link) = &book.link {
        println!();
        println!("{}", style(link).cyan().underlined());
    }
}
