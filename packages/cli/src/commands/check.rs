use anyhow::{anyhow, Result};
use blockpost_parser::{format_errors, normalize, parse_with_diagnostics};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Stored HTML file or directory to check
    pub input: PathBuf,

    /// Exit with an error when any markup was repaired
    #[arg(long)]
    pub strict: bool,
}

pub fn check(args: CheckArgs, cwd: &str) -> Result<()> {
    let input = PathBuf::from(cwd).join(&args.input);
    println!("🔍 {} stored markup", "Checking".green().bold());
    println!("   Input: {}", args.input.display());
    println!();

    let files = if input.is_file() {
        vec![input.clone()]
    } else if input.is_dir() {
        find_html_files(&input)
    } else {
        return Err(anyhow!("Input path does not exist: {}", input.display()));
    };

    let mut total_diagnostics = 0;
    for file in &files {
        total_diagnostics += check_file(file)?;
    }

    println!();
    println!(
        "Checked {} files, {} repairs needed",
        files.len(),
        total_diagnostics
    );

    if args.strict && total_diagnostics > 0 {
        return Err(anyhow!("{} markup problems found", total_diagnostics));
    }
    Ok(())
}

fn find_html_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("html"))
        .collect();
    files.sort();
    files
}

fn check_file(path: &Path) -> Result<usize> {
    let source = fs::read_to_string(path)?;
    let normalized = normalize(&source);
    let (_, errors) = parse_with_diagnostics(&normalized);

    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("unknown");

    if errors.is_empty() {
        println!("  {} {}", "✓".green(), file_name);
    } else {
        println!("  {} {} ({} repairs)", "⚠".yellow(), file_name, errors.len());
        eprintln!("{}", format_errors(&normalized, file_name, &errors));
    }
    Ok(errors.len())
}
