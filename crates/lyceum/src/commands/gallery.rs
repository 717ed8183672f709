//! Gallery command - photos and videos.

use std::path::PathBuf;

use anyhow::{Context as _, Result, bail};
use clap::{Args, Subcommand, ValueEnum};
use console::Style;
use lyceum_client::{GalleryItem, GalleryUpload, MediaType, UpdateGalleryItemRequest};

use super::{Context, heading, truncate};

/// Arguments for the gallery command.
#[derive(Args, Debug)]
pub struct GalleryArgs {
    #[command(subcommand)]
    pub command: GalleryCommand,
}

/// Media filter accepted on the command line.
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum MediaKind {
    Image,
    Video,
}

impl From<MediaKind> for MediaType {
    fn from(kind: MediaKind) -> Self {
        match kind {
            MediaKind::Image => MediaType::Image,
            MediaKind::Video => MediaType::Video,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum GalleryCommand {
    /// List gallery items
    List {
        /// Only images or only videos
        #[arg(long = "type", value_enum)]
        kind: Option<MediaKind>,
    },

    /// Upload a photo or video
    Upload {
        /// File to upload
        file: PathBuf,

        /// Title shown under the item
        #[arg(long)]
        title: Option<String>,

        /// Longer caption
        #[arg(long)]
        caption: Option<String>,
    },

    /// Change an item's title or caption
    Update {
        /// Item ID
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        caption: Option<String>,
    },

    /// Delete an item
    Remove {
        /// Item ID
        id: String,
    },
}

/// Run the gallery command.
pub async fn run(args: GalleryArgs, ctx: &Context) -> Result<()> {
    match args.command {
        // Checked before connecting so a bad path fails fast.
        GalleryCommand::Upload {
            file,
            title,
            caption,
        } => {
            let upload = read_upload(&file, title, caption)?;
            let size = upload.bytes.len();
            let item = ctx.client()?.gallery().upload(upload).await?;
            if ctx.json_output {
                return ctx.print_json(&item);
            }
            ctx.success(format!(
                "Uploaded {} ({} KiB) as {}",
                file.display(),
                size.div_ceil(1024),
                item.id
            ));
        }
        GalleryCommand::List { kind } => {
            let api = ctx.client()?.gallery();
            let items = match kind {
                Some(kind) => api.list_by_type(kind.into()).await?,
                None => api.list().await?,
            };
            if ctx.json_output {
                return ctx.print_json(&items);
            }

            heading("Gallery");
            if items.is_empty() {
                println!("{}", Style::new().dim().apply_to("Gallery is empty"));
            }
            for item in &items {
                print_row(item);
            }
        }
        GalleryCommand::Update { id, title, caption } => {
            if title.is_none() && caption.is_none() {
                bail!("nothing to update: pass --title and/or --caption");
            }
            let item = ctx
                .client()?
                .gallery()
                .update(&id, UpdateGalleryItemRequest { title, caption })
                .await?;
            if ctx.json_output {
                return ctx.print_json(&item);
            }
            ctx.success(format!("Updated {}", item.id));
        }
        GalleryCommand::Remove { id } => {
            ctx.client()?.gallery().delete(&id).await?;
            ctx.success(format!("Deleted {}", id));
        }
    }

    Ok(())
}

/// Read a file into an upload, rejecting types the gallery cannot show.
fn read_upload(
    path: &std::path::Path,
    title: Option<String>,
    caption: Option<String>,
) -> Result<GalleryUpload> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("not a file: {}", path.display()))?
        .to_string();
    if MediaType::from_file_name(&file_name).is_none() {
        bail!("{} is not a supported image or video file", file_name);
    }
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;

    Ok(GalleryUpload {
        file_name,
        bytes,
        title,
        caption,
    })
}

fn print_row(item: &GalleryItem) {
    let dim = Style::new().dim();
    println!(
        "{:<6} {:<30} {}",
        item.media_type.as_str(),
        truncate(item.title.as_deref().unwrap_or("(untitled)"), 30),
        dim.apply_to(&item.url)
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_upload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gala.jpg");
        std::fs::write(&path, b"jpeg bytes").unwrap();

        let upload = read_upload(&path, Some("Gala".into()), None).unwrap();
        assert_eq!(upload.file_name, "gala.jpg");
        assert_eq!(upload.bytes, b"jpeg bytes");
        assert_eq!(upload.title.as_deref(), Some("Gala"));
    }

    #[test]
    fn test_read_upload_rejects_unknown_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("minutes.docx");
        std::fs::write(&path, b"doc").unwrap();

        let err = read_upload(&path, None, None).unwrap_err();
        assert!(err.to_string().contains("not a supported"));
    }

    #[test]
    fn test_read_upload_missing_file() {
        let err = read_upload(std::path::Path::new("/nonexistent/a.png"), None, None).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
