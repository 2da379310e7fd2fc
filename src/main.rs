//! # Serial-dl CLI
//!
//! Command-line interface for the serial-dl library.
//! Downloads every file of a numbered series from the URL of its last file.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use log::error;
use serial_dl::{FetchOptions, Fetcher, SequenceSpec};

mod cli;

/// Command-line interface for serial-dl
#[derive(Parser, Debug)]
#[command(name = "serial-dl")]
#[command(version)]
#[command(about = "Download the files saved with a serial number at once")]
#[command(long_about = "Downloads a numbered file series from the URL of its last file:
  serial-dl -u https://example.com/book/page120.jpg -s 001 -o ./book
      fetches page001.jpg ... page120.jpg and saves them as 001.jpg ... 120.jpg

The digit count of the start number sets the zero-fill width (-s 1, -s 01, -s 001).")]
struct Cli {
    /// URL of the last file of the numbered series
    #[arg(short, long)]
    url: String,

    /// First file number of the series, e.g. 001 or 01
    #[arg(short, long = "start", visible_alias = "start-num")]
    start: String,

    /// Output destination directory
    #[arg(short, long)]
    output: PathBuf,

    /// Show the URLs that would be downloaded without downloading
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging to stderr
    let default_filter = if cli.verbose { "debug" } else { "error" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .init();

    if let Err(e) = run(cli).await {
        error!("Something went wrong: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let spec = serial_dl::plan(&cli.url, &cli.start)
        .with_context(|| format!("could not infer a numbered series from {}", cli.url))?;

    if cli.verbose {
        eprintln!("serial-dl v{} starting...", env!("CARGO_PKG_VERSION"));
        show_series_info(&spec);
    }

    if cli.dry_run {
        eprintln!("🔍 [DRY RUN] Would download {} files to {}", spec.len(), cli.output.display());
        for line in dry_run_lines(&spec, &cli.output) {
            println!("{line}");
        }
        return Ok(());
    }

    eprintln!("📁 Saving to: {}", cli.output.display());

    let progress = cli::ProgressManager::new(
        spec.len() as u64,
        &format!("🌐 Downloading {} files from {}", spec.len(), spec.directory),
    );
    let options = FetchOptions {
        observer: Some(progress.observer()),
        ..Default::default()
    };

    let fetcher = Fetcher::new(options).context("failed to build HTTP client")?;
    fetcher
        .fetch_all(spec.expand(), &cli.output)
        .await
        .with_context(|| format!("failed to prepare output directory {}", cli.output.display()))?;

    progress.finish();
    Ok(())
}

/// One `url -> destination` line per item
fn dry_run_lines(spec: &SequenceSpec, out_dir: &Path) -> Vec<String> {
    spec.expand()
        .map(|item| {
            let destination = item.destination_in(out_dir);
            format!("{} -> {}", item.source_url, destination.display())
        })
        .collect()
}

/// Show the inferred pattern
fn show_series_info(spec: &SequenceSpec) {
    eprintln!("   directory: {}", spec.directory);
    eprintln!("   prefix:    {:?}", spec.prefix);
    eprintln!("   suffix:    {:?}", spec.suffix);
    eprintln!("   extension: {:?}", spec.extension);
    eprintln!(
        "   numbers:   {}..={} (zero-filled to {})",
        spec.start_value, spec.end_value, spec.zero_fill_width
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_requires_all_three_flags() {
        assert!(Cli::try_parse_from(["serial-dl", "-u", "https://x/1.jpg", "-s", "1"]).is_err());
        assert!(Cli::try_parse_from(["serial-dl", "-u", "https://x/1.jpg", "-o", "out"]).is_err());
        assert!(Cli::try_parse_from(["serial-dl", "-s", "1", "-o", "out"]).is_err());
    }

    #[test]
    fn test_cli_keeps_leading_zeros() {
        let cli = Cli::try_parse_from([
            "serial-dl", "-u", "https://x/p/page120.jpg", "-s", "001", "-o", "out",
        ])
        .unwrap();
        assert_eq!(cli.start, "001");
        assert_eq!(cli.output, PathBuf::from("out"));
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_cli_start_num_alias() {
        let cli = Cli::try_parse_from([
            "serial-dl", "--url", "https://x/9.png", "--start-num", "01", "--output", "o", "--dry-run",
        ])
        .unwrap();
        assert_eq!(cli.start, "01");
        assert!(cli.dry_run);
    }

    #[test]
    fn test_dry_run_lines() {
        let spec = serial_dl::plan("https://example.com/v/ep3.mp4", "1").unwrap();
        let lines = dry_run_lines(&spec, Path::new("out"));
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            format!("https://example.com/v/ep1.mp4 -> {}", Path::new("out").join("1.mp4").display())
        );
    }
}
