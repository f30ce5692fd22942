//! Agent-Atlas main entry point
//!
//! This is the command-line interface for the Agent-Atlas directory scraper.

use agent_atlas::config::{apply_overrides, load_config_with_hash, Config, Profile};
use agent_atlas::crawler::{run_crawl, Shutdown};
use agent_atlas::output::{print_statistics, DatasetStatistics};
use agent_atlas::storage::{JsonStore, SnapshotStore};
use agent_atlas::ScrapeError;
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Agent-Atlas: a polite directory-site scraper
///
/// Agent-Atlas walks a directory site's main listing and every category
/// listing, merges what it finds into one record per item, enriches a
/// bounded number of records from their detail pages and writes the
/// dataset as JSON.
#[derive(Parser, Debug)]
#[command(name = "agent-atlas")]
#[command(version)]
#[command(about = "A polite directory-site scraper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the saved database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,

    /// Override the number of records enriched from detail pages
    #[arg(long, value_name = "N")]
    enrich_limit: Option<usize>,

    /// Override the pacing profile (thorough or fast)
    #[arg(long, value_name = "PROFILE")]
    profile: Option<Profile>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    apply_overrides(&mut config, cli.enrich_limit, cli.profile)
        .context("Invalid command-line overrides")?;

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config)
    } else if cli.stats {
        handle_stats(&config)
    } else {
        handle_crawl(config).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("agent_atlas=info,warn"),
            1 => EnvFilter::new("agent_atlas=debug,info"),
            2 => EnvFilter::new("agent_atlas=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows the traversal plan
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let (min_delay, max_delay) = config.crawler.delay_range();
    let category_index = config.site.category_index_url()?;
    let store = JsonStore::from_config(&config.output);

    println!("=== Agent-Atlas Dry Run ===\n");

    println!("Site:");
    println!("  Root URL: {}", config.site.root_url);
    println!("  Category index: {}", category_index);
    println!("  Item path segment: {}", config.site.item_path_segment);
    println!("  Category path segment: {}", config.site.category_path_segment);
    println!("  Tag path segment: {}", config.site.tag_path_segment);

    println!("\nCrawler Configuration:");
    println!("  Profile: {}", config.crawler.profile);
    println!(
        "  Delay between requests: {}-{}ms",
        min_delay.as_millis(),
        max_delay.as_millis()
    );
    println!("  Request timeout: {}s", config.crawler.request_timeout().as_secs());
    println!("  Max pages per listing: {}", config.crawler.max_pages);
    println!("  Enrich limit: {}", config.crawler.enrich_limit);
    println!("  Checkpoint every: {} records", config.crawler.checkpoint_every);

    println!("\nHTTP:");
    println!("  User agent: {}", config.http.user_agent);
    println!("  Accept-Language: {}", config.http.accept_language);

    println!("\nOutput:");
    println!("  Database: {}", store.database_path().display());
    println!("  Checkpoints: {}_<tag>.json", config.output.checkpoint_prefix);

    println!("\nTraversal Plan:");
    println!("  1. Discover categories from {}", category_index);
    println!("  2. Walk the main listing at {}", config.site.root_url);
    println!("  3. Walk every discovered category listing");
    println!(
        "  4. Enrich up to {} records from their detail pages",
        config.crawler.enrich_limit
    );

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the --stats mode: shows statistics from the saved database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let store = JsonStore::from_config(&config.output);
    let path = store.database_path();

    println!("Database: {}\n", path.display());

    let dataset = store
        .load_snapshot()
        .with_context(|| format!("Failed to load {}", path.display()))?;

    println!("Scraped at: {}", dataset.metadata.scraped_at);
    println!("Source: {}", dataset.metadata.source_url);
    println!("Scraper version: {}\n", dataset.metadata.scraper_version);

    let stats = DatasetStatistics::from_dataset(&dataset.categories, &dataset.records);
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        "Profile: {}, max pages: {}, enrich limit: {}",
        config.crawler.profile,
        config.crawler.max_pages,
        config.crawler.enrich_limit
    );

    let shutdown = Shutdown::new();
    let _ctrl_c = shutdown.listen_for_ctrl_c();

    match run_crawl(config, shutdown).await {
        Ok(report) => {
            for root in &report.ceiling_hits {
                tracing::warn!("{} stopped at the page limit", root);
            }
            println!();
            print_statistics(&report.statistics);
            println!("✓ Database saved to: {}", report.database_path.display());
            Ok(())
        }
        Err(ScrapeError::Interrupted) => {
            tracing::warn!("Crawl interrupted; progress checkpoint written");
            Err(ScrapeError::Interrupted.into())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
