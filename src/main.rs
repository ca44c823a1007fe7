//! # Shirt Scraper CLI
//!
//! Runs a single scrape of the shirt catalog and writes the dated CSV file.
//! Every setting defaults to the catalog's own URLs and paths; the flags only
//! exist to point the scraper somewhere else.
//!
//! Exit codes: 0 success, 1 entry point unreachable, 2 some detail pages
//! failed, 3 the run could not start or its output could not be written.

mod telemetry;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use shirt_scraper::config::{
    DEFAULT_ENTRY_URL, DEFAULT_LOG_FILE, DEFAULT_OUTPUT_DIR, DEFAULT_SITE_BASE,
};
use shirt_scraper::pipeline::EXIT_OUTPUT_FAILURE;
use shirt_scraper::{Pipeline, ProgressEvent, RunSummary, ScraperConfig};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::instrument;

#[derive(Parser, Debug)]
#[command(author, version, about = "Scrape the shirt catalog into a dated CSV file", long_about = None)]
struct Cli {
    /// Site base that relative links and images are joined to
    #[arg(long, default_value = DEFAULT_SITE_BASE)]
    site_base: String,

    /// Listing page URL
    #[arg(long, default_value = DEFAULT_ENTRY_URL)]
    entry_url: String,

    /// Directory for the dated CSV files
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Error log file
    #[arg(short, long, default_value = DEFAULT_LOG_FILE)]
    log_file: PathBuf,

    /// Maximum number of detail pages fetched at once
    #[arg(short, long, default_value = "8")]
    concurrency: usize,

    /// Per-request timeout in seconds
    #[arg(short, long, default_value = "30")]
    timeout_secs: u64,

    /// Skip the connectivity probe of the entry URL
    #[arg(long)]
    no_precheck: bool,

    /// Summary format (text|json)
    #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    /// Hide the progress bar
    #[arg(short, long)]
    quiet: bool,

    /// Also write a debug trace to this directory
    #[arg(long)]
    trace_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _telemetry = telemetry::init_tracing_subscriber(cli.trace_dir.as_deref())?;

    let code = match scrape_command(&cli).await {
        Ok(summary) => {
            print_summary(&cli.format, &summary)?;
            summary.status.exit_code()
        }
        Err(e) => {
            eprintln!("Scrape failed: {:#}", e);
            EXIT_OUTPUT_FAILURE
        }
    };

    drop(_telemetry);
    std::process::exit(code);
}

#[instrument(skip(cli))]
async fn scrape_command(cli: &Cli) -> anyhow::Result<RunSummary> {
    let config = ScraperConfig::builder()
        .site_base(cli.site_base.clone())
        .entry_url(cli.entry_url.clone())
        .output_dir(cli.output_dir.clone())
        .log_file(cli.log_file.clone())
        .max_concurrency(cli.concurrency)
        .timeout_secs(cli.timeout_secs)
        .precheck(!cli.no_precheck)
        .build();

    let mut pipeline = Pipeline::new(config)?;

    let progress_handle = if cli.quiet {
        None
    } else {
        let progress_bar = progress_bar()?;
        let (progress_sender, progress_receiver) = mpsc::channel(100);
        pipeline = pipeline
            .with_progress(progress_sender)
            .with_progress_bar(progress_bar.clone());
        Some(tokio::spawn(drive_progress_bar(
            progress_bar,
            progress_receiver,
        )))
    };

    let result = pipeline.run().await;

    // The progress task ends once the pipeline's sender is dropped
    drop(pipeline);
    if let Some(handle) = progress_handle {
        let _ = handle.await;
    }

    Ok(result?)
}

fn progress_bar() -> anyhow::Result<ProgressBar> {
    let progress_bar = ProgressBar::new(0);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("##-"),
    );
    progress_bar.set_message("Reading listing page...");
    Ok(progress_bar)
}

async fn drive_progress_bar(
    progress_bar: ProgressBar,
    mut progress_receiver: mpsc::Receiver<ProgressEvent>,
) {
    while let Some(event) = progress_receiver.recv().await {
        match event {
            ProgressEvent::LinksFound(count) => {
                progress_bar.set_length(count as u64);
                progress_bar.set_message(format!("Scraping {} shirts", count));
            }
            ProgressEvent::DetailSettled { url, scraped } => {
                progress_bar.inc(1);
                let verb = if scraped { "Scraped" } else { "Failed" };
                progress_bar.set_message(format!("{} {}", verb, url));
            }
        }
    }
    progress_bar.finish_and_clear();
}

fn print_summary(format: &str, summary: &RunSummary) -> anyhow::Result<()> {
    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(summary)?);
        }
        _ => {
            if let Some(path) = &summary.output_path {
                let shown = std::path::absolute(path).unwrap_or_else(|_| path.clone());
                println!("...Done");
                println!("Please check this file: {}", shown.display());
            }
            println!(
                "Scraped {} of {} shirts",
                summary.records_written, summary.links_found
            );
            for failure in &summary.failures {
                println!("  failed: {} ({})", failure.url, failure.error);
            }
            if summary.abandoned > 0 {
                println!("  {} detail pages never reported back", summary.abandoned);
            }
        }
    }
    Ok(())
}
