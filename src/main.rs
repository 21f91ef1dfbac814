//! bier-index-scraper main entry point
//!
//! This is the command-line interface for the bier-index.de scraper.

use anyhow::Context;
use bier_index_scraper::config::{load_config, validate, Config};
use bier_index_scraper::crawler::{Coordinator, PhaseReport, ScrapeReport};
use bier_index_scraper::output::{load_statistics, print_statistics};
use bier_index_scraper::storage::open_storage;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// bier-index-scraper: mirrors bier-index.de into a SQLite database
///
/// Breweries and beers are discovered through the site's sitemap. Reviews
/// and their authors are taken from the beer pages, and member descriptions
/// from the profile pages. Records that already exist are never touched, so
/// repeated runs only add what is new.
#[derive(Parser, Debug)]
#[command(name = "bier-index-scraper")]
#[command(version)]
#[command(about = "Scrapes bier-index.de into SQLite", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Show statistics from the database and exit
    #[arg(long)]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?
        }
        None => {
            let config = Config::default();
            validate(&config).context("Built-in configuration is invalid")?;
            config
        }
    };

    if cli.stats {
        handle_stats(&config)
    } else {
        handle_scrape(config).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("bier_index_scraper=info,warn"),
            1 => EnvFilter::new("bier_index_scraper=debug,info"),
            2 => EnvFilter::new("bier_index_scraper=trace,debug"),
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

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let storage = open_storage(Path::new(&config.output.database_path))
        .with_context(|| format!("Failed to open {}", config.output.database_path))?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main scrape operation
async fn handle_scrape(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        "Scraping {} into {} ({} concurrent requests)",
        config.scraper.base_url,
        config.output.database_path,
        config.scraper.concurrency
    );

    let mut coordinator = Coordinator::new(config).context("Failed to set up the scraper")?;
    let report = match coordinator.run().await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Scrape failed: {}", e);
            return Err(e.into());
        }
    };

    log_report(&report);

    let stats = load_statistics(coordinator.storage())?;
    tracing::info!(
        "Database now holds {} breweries, {} beers, {} reviews and {} users",
        stats.breweries,
        stats.beers,
        stats.reviews,
        stats.users
    );

    Ok(())
}

fn log_report(report: &ScrapeReport) {
    let phases: [(&str, &PhaseReport); 4] = [
        ("Breweries", &report.breweries),
        ("Beers", &report.beers),
        ("Reviews", &report.reviews),
        ("Users", &report.users),
    ];
    for (name, phase) in phases {
        tracing::info!(
            "{}: {} seen, {} stored, {} already present, {} failed",
            name,
            phase.total,
            phase.stored,
            phase.skipped,
            phase.failed
        );
    }
}
