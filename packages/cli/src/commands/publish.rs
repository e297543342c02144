use crate::commands::compile::load_document;
use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use blockpost_compiler_html::compile_document;
use blockpost_editor::validate_publish;
use blockpost_storage::{ImageStorage, MemoryStorage, NewPost, PostStatus, PostStorage, Upload};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Args)]
pub struct PublishArgs {
    /// Block document to publish
    pub input: PathBuf,

    /// Post title
    #[arg(short, long)]
    pub title: String,

    /// Author id recorded on the post
    #[arg(short, long)]
    pub author: String,

    /// Cover image file
    #[arg(long)]
    pub cover: Option<PathBuf>,

    /// Save as a draft instead of publishing
    #[arg(long, conflicts_with = "archive")]
    pub draft: bool,

    /// Save straight to the archive
    #[arg(long)]
    pub archive: bool,
}

impl PublishArgs {
    fn status(&self) -> PostStatus {
        match (self.draft, self.archive) {
            (true, _) => PostStatus::Draft,
            (_, true) => PostStatus::Archived,
            _ => PostStatus::Published,
        }
    }
}

pub fn publish(args: PublishArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let document = load_document(&PathBuf::from(cwd).join(&args.input))?;

    validate_publish(&args.title, &document)?;

    let cover_image = match &args.cover {
        Some(path) => Some(read_cover(&PathBuf::from(cwd).join(path))?),
        None => None,
    };

    let store_file = config.get_store_file(cwd);
    let mut storage = MemoryStorage::open(config.storage.clone(), &store_file)?;

    let post = storage.create_post(NewPost {
        title: args.title.clone(),
        content: compile_document(&document, config.compiler_options.clone()),
        cover_image,
        author_id: Some(args.author.clone()),
        status: args.status(),
    })?;
    storage.save(&store_file)?;
    info!(post = %post.id, store = %store_file.display(), "post saved");

    println!(
        "{} {} {}",
        "✅".green(),
        match post.status {
            PostStatus::Draft => "Saved draft",
            PostStatus::Published => "Published",
            PostStatus::Archived => "Archived",
        },
        post.title.bright_white()
    );
    println!("   id: {}", post.id);
    if let Some(url) = post.cover_image.as_ref().and_then(|id| storage.view_url(id)) {
        println!("   cover: {}", url);
    }
    Ok(())
}

fn read_cover(path: &Path) -> Result<Upload> {
    let bytes = fs::read(path).with_context(|| format!("Cannot read {}", path.display()))?;
    let mime = match path.extension().and_then(|ext| ext.to_str()) {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => return Err(anyhow!("Unsupported image type: {}", path.display())),
    };
    Ok(Upload::new(bytes, mime))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        args: PublishArgs,
    }

    fn status_for(flags: &[&str]) -> PostStatus {
        let argv = ["blockpost", "post.json", "-t", "T", "-a", "me"];
        let argv = argv.iter().chain(flags).copied();
        Cli::parse_from(argv).args.status()
    }

    #[test]
    fn test_status_flags() {
        assert_eq!(status_for(&[]), PostStatus::Published);
        assert_eq!(status_for(&["--draft"]), PostStatus::Draft);
        assert_eq!(status_for(&["--archive"]), PostStatus::Archived);
    }

    #[test]
    fn test_draft_and_archive_conflict() {
        let argv = ["blockpost", "post.json", "-t", "T", "-a", "me", "--draft", "--archive"];
        assert!(Cli::try_parse_from(argv).is_err());
    }
}
