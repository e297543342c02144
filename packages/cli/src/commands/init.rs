use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use blockpost_editor::{BlockType, Document};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Directory for block documents
    #[arg(short, long, default_value = "posts")]
    pub src_dir: String,

    /// Pretty-print compiled HTML
    #[arg(long)]
    pub pretty: bool,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing Blockpost project...".bright_blue().bold());

    let src_dir = PathBuf::from(cwd).join(&args.src_dir);
    if !src_dir.exists() {
        fs::create_dir_all(&src_dir)?;
        println!("  {} Created {}/", "✓".green(), args.src_dir);
    }

    // Example post
    let example_file = src_dir.join("welcome.json");
    if !example_file.exists() {
        fs::write(&example_file, example_document().to_json()?)?;
        println!("  {} Created welcome.json", "✓".green());
    }

    let mut config = Config {
        src_dir: args.src_dir.clone(),
        ..Config::default()
    };
    config.compiler_options.pretty = args.pretty;

    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Edit {}/welcome.json", args.src_dir);
    println!("  2. Run: blockpost compile");
    println!("  3. Check output in {}/", config.out_dir);

    Ok(())
}

fn example_document() -> Document {
    let mut doc = Document::new("posts/welcome");
    let intro = doc.blocks()[0].id().clone();
    doc.update_block_content(&intro, "Welcome to your first post.");
    doc.insert_block(0, BlockType::TableOfContents, "");
    doc.insert_block(1, BlockType::Heading1, "Getting started");
    doc.insert_block(2, BlockType::Callout, "Type / in a block to change its type.");
    doc.reorder(0, 3);
    doc
}
