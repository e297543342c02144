use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use blockpost_compiler_html::compile_document;
use blockpost_editor::Document;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Args)]
pub struct CompileArgs {
    /// Document or directory to compile (defaults to the configured source directory)
    pub path: Option<PathBuf>,

    /// Output to stdout instead of files
    #[arg(long)]
    pub stdout: bool,

    /// Output directory (overrides config)
    #[arg(short, long)]
    pub out_dir: Option<String>,

    /// Put each block on its own line
    #[arg(long)]
    pub pretty: bool,
}

pub fn compile(args: CompileArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let input = args
        .path
        .clone()
        .map(|path| PathBuf::from(cwd).join(path))
        .unwrap_or_else(|| config.get_src_dir(cwd));

    if !input.exists() {
        return Err(anyhow!("Input path does not exist: {}", input.display()));
    }

    println!("{}", "🔨 Compiling posts...".bright_blue().bold());

    let (root, documents) = if input.is_file() {
        let root = input.parent().map(Path::to_path_buf).unwrap_or_default();
        (root, vec![input.clone()])
    } else {
        (input.clone(), find_documents(&input))
    };

    if documents.is_empty() {
        println!("{}", "⚠️  No documents found".yellow());
        return Ok(());
    }

    println!("Found {} documents", documents.len());

    let mut success_count = 0;
    let mut error_count = 0;

    for document in &documents {
        let relative_path = document.strip_prefix(&root).unwrap_or(document);
        match compile_file(document, relative_path, &args, &config, cwd) {
            Ok(output_path) => {
                success_count += 1;
                println!(
                    "  {} {} → {}",
                    "✓".green(),
                    relative_path.display(),
                    output_path
                );
            }
            Err(e) => {
                error_count += 1;
                eprintln!(
                    "  {} {} - {}",
                    "✗".red(),
                    relative_path.display(),
                    format!("{e:#}").red()
                );
            }
        }
    }

    println!();
    if error_count == 0 {
        println!(
            "{} Compiled {} documents successfully",
            "✅".green(),
            success_count
        );
        Ok(())
    } else {
        Err(anyhow!(
            "Compiled {} documents, {} failed",
            success_count,
            error_count
        ))
    }
}

pub(crate) fn find_documents(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("json"))
        .collect();
    files.sort();
    files
}

pub(crate) fn load_document(path: &Path) -> Result<Document> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Cannot read {}", path.display()))?;
    Ok(Document::from_json(&source)?)
}

fn compile_file(
    file_path: &Path,
    relative_path: &Path,
    args: &CompileArgs,
    config: &Config,
    cwd: &str,
) -> Result<String> {
    let document = load_document(file_path)?;

    let mut options = config.compiler_options.clone();
    options.pretty |= args.pretty;
    let output = compile_document(&document, options);

    if args.stdout {
        println!("{}", output);
        return Ok("stdout".to_string());
    }

    let out_dir = match &args.out_dir {
        Some(out) => PathBuf::from(cwd).join(out),
        None => config.get_out_dir(cwd),
    };
    let output_file = out_dir.join(relative_path).with_extension("html");

    if let Some(parent) = output_file.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&output_file, output)?;

    Ok(output_file.display().to_string())
}
