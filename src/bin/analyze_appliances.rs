//! Batch CWT/XWT analysis of every appliance recording in a directory

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use appliance_cwt::plot::{NoopSink, PngScalogramWriter, ScalogramSink};
use appliance_cwt::{run_batch, AnalysisConfig};

#[derive(Parser, Debug)]
#[command(name = "analyze-appliances")]
#[command(about = "Wavelet analysis of appliance current signatures")]
struct Args {
    /// Directory containing the CSV recordings
    #[arg(default_value = ".")]
    data_dir: PathBuf,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Results archive (defaults to output.results_filename)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Directory for scalogram images
    #[arg(long, default_value = "plots")]
    plot_dir: PathBuf,

    /// Skip plot rendering
    #[arg(long)]
    no_plots: bool,

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

    let config = match &args.config {
        Some(path) => AnalysisConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output.results_filename));

    let mut sink: Box<dyn ScalogramSink> = if config.plot.save_plots && !args.no_plots {
        Box::new(PngScalogramWriter::new(&args.plot_dir, &config.plot)?)
    } else {
        Box::new(NoopSink)
    };

    let report = run_batch(&args.data_dir, &output, &config, sink.as_mut())
        .with_context(|| format!("analyzing {}", args.data_dir.display()))?;

    println!("Analyzed:  {}", report.analyzed.join(", "));
    println!("Compared:  {}", report.compared.join(", "));
    for (item, reason) in &report.skipped {
        println!("Skipped:   {} ({})", item, reason);
    }
    match &report.archive_path {
        Some(path) => println!("Results saved to {}", path.display()),
        None => println!("No results to save"),
    }
    Ok(())
}
