//! Tweet-Harvest main entry point
//!
//! This is the command-line interface for the Tweet-Harvest timeline crawler.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tweet_harvest::config::{load_config_with_hash, Config};
use tweet_harvest::crawler::{crawl, RequestTemplate};
use tweet_harvest::state::Cursor;
use tweet_harvest::storage::encode_key;
use tracing_subscriber::EnvFilter;

/// Tweet-Harvest: a resumable timeline crawler
///
/// Tweet-Harvest walks a paginated timeline page by page, saving every raw
/// response, and stops once the timeline content is older than the cutoff
/// year. Re-running it resumes from the pages already on disk.
#[derive(Parser, Debug)]
#[command(name = "tweet-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A resumable timeline crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Cursor to start from instead of the newest page
    #[arg(long, value_name = "CURSOR")]
    cursor: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the first request without fetching anything
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics for the saved pages and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let start = Cursor::from_token(cli.cursor);

    if cli.dry_run {
        handle_dry_run(&config, &start)
    } else if cli.stats {
        handle_stats(&config)
    } else {
        handle_crawl(&config, start).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("tweet_harvest=info,warn"),
            1 => EnvFilter::new("tweet_harvest=debug,info"),
            2 => EnvFilter::new("tweet_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows the first request
fn handle_dry_run(config: &Config, start: &Cursor) -> anyhow::Result<()> {
    let template = RequestTemplate::from_config(&config.request)?;
    let target = template.build(start);

    println!("=== Tweet-Harvest Dry Run ===\n");

    println!("Request:");
    println!("  Endpoint: {}", template.base_url());
    println!("  Start cursor: {}", start);
    println!("  First URL: {}", target.url);
    println!("  Headers:");
    for name in template.header_names() {
        println!("    - {}", name);
    }

    println!("\nCrawl:");
    println!("  Cutoff year: {}", config.crawl.effective_cutoff_year());
    println!(
        "  Politeness interval: {}ms",
        config.crawl.politeness_interval_ms
    );
    println!("  Retry delays: {:?}s", config.crawl.retry_delays_secs);
    println!("  Request timeout: {}s", config.crawl.request_timeout_secs);

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory);
    println!(
        "  First page file: {}-{}.json",
        config.output.file_prefix,
        encode_key(start.storage_key())
    );

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the --stats mode: summarises the saved pages
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    use tweet_harvest::output::{load_statistics, print_statistics};
    use tweet_harvest::storage::open_store;

    println!("Directory: {}\n", config.output.directory);

    let store = open_store(&config.output)?;
    let stats = load_statistics(&store)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, start: Cursor) -> anyhow::Result<()> {
    if start.is_initial() {
        tracing::info!("Starting crawl from the newest page");
    } else {
        tracing::info!("Starting crawl from cursor {}", start);
    }

    let summary = crawl(config, start.clone())
        .await
        .with_context(|| format!("Crawl starting at cursor {} failed", start))?;

    println!(
        "Done: {} ({} pages fetched, {} loaded from {})",
        summary.stop_reason, summary.pages_fetched, summary.pages_loaded, config.output.directory
    );

    Ok(())
}
