mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    check, compile, init, publish, render, CheckArgs, CompileArgs, InitArgs, PublishArgs,
    RenderArgs,
};
use tracing_subscriber::EnvFilter;

/// Blockpost CLI - block-based blog posts
#[derive(Parser, Debug)]
#[command(name = "blockpost")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new Blockpost project
    Init(InitArgs),

    /// Compile block documents to HTML
    Compile(CompileArgs),

    /// Render stored post HTML for display
    Render(RenderArgs),

    /// Report markup the renderer has to repair
    Check(CheckArgs),

    /// Validate a document and save it to the post store
    Publish(PublishArgs),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|cwd| {
            let cwd = cwd.display().to_string();
            match cli.command {
                Command::Init(args) => init(args, &cwd),
                Command::Compile(args) => compile(args, &cwd),
                Command::Render(args) => render(args, &cwd),
                Command::Check(args) => check(args, &cwd),
                Command::Publish(args) => publish(args, &cwd),
            }
        });

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
