//! Clean and normalize raw CSV recordings into `<stem>_processed.csv`

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use appliance_cwt::config::FileConfig;
use appliance_cwt::data::{discover_files, process_csv_file};

#[derive(Parser, Debug)]
#[command(name = "preprocess-data")]
#[command(about = "Drop invalid rows and outliers, then z-score every column")]
struct Args {
    /// Directory containing the raw CSV recordings
    #[arg(default_value = ".")]
    data_dir: PathBuf,

    /// Output directory for processed files
    #[arg(long, default_value = "processed_data")]
    output_dir: PathBuf,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    let files = FileConfig {
        max_files: usize::MAX,
        ..FileConfig::default()
    };
    let inputs = discover_files(&args.data_dir, &files)
        .with_context(|| format!("listing {}", args.data_dir.display()))?;
    if inputs.is_empty() {
        anyhow::bail!("no CSV files found in {}", args.data_dir.display());
    }

    let mut failed = 0usize;
    for path in &inputs {
        match process_csv_file(path, &args.output_dir) {
            Ok(out) => println!("{} -> {}", path.display(), out.display()),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to process");
                failed += 1;
            }
        }
    }

    println!("Processed {} of {} files", inputs.len() - failed, inputs.len());
    Ok(())
}
