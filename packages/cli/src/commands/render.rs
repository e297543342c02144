use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use blockpost_renderer::{ClientSideDiagrams, Renderer};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Stored post HTML
    pub input: PathBuf,

    /// Output to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,

    /// Emit the rendered tree as JSON
    #[arg(long)]
    pub json: bool,

    /// Output directory (overrides config)
    #[arg(short, long)]
    pub out_dir: Option<String>,
}

pub fn render(args: RenderArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let input = PathBuf::from(cwd).join(&args.input);
    if !input.is_file() {
        return Err(anyhow!("Input file does not exist: {}", input.display()));
    }

    let source = fs::read_to_string(&input)
        .with_context(|| format!("Cannot read {}", input.display()))?;
    let rendered = Renderer::new(&ClientSideDiagrams).render(&source);

    let output = if args.json {
        serde_json::to_string_pretty(&rendered)?
    } else {
        rendered.to_html()
    };

    if args.stdout {
        println!("{}", output);
        return Ok(());
    }

    let out_dir = match &args.out_dir {
        Some(out) => PathBuf::from(cwd).join(out),
        None => config.get_out_dir(cwd),
    };
    let file_name = input
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("post");
    let extension = if args.json { "json" } else { "html" };
    let output_file = out_dir.join(format!("{file_name}.rendered.{extension}"));

    fs::create_dir_all(&out_dir)?;
    fs::write(&output_file, output)?;

    println!(
        "  {} {} → {} ({} blocks, {} headings)",
        "✓".green(),
        args.input.display(),
        output_file.display(),
        rendered.blocks.len(),
        rendered.headings.len()
    );
    Ok(())
}
