//! Job scraper command line entry point.

use anyhow::{bail, Context, Result};
use clap::Parser;
use magpie_browser::BrowserEngine;
use magpie_core::{AppConfig, TraversalMode};
use magpie_db::Database;
use magpie_scraper::{RateLimiter, Scraper};
use magpie_sites::SeekSite;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Run the job scraper for a specific site.
#[derive(Debug, Parser)]
#[command(name = "magpie", version, about)]
struct Args {
    /// The job site to scrape (e.g. seek)
    #[arg(long)]
    site: Option<String>,

    /// List all available job sites and exit
    #[arg(long)]
    list_sites: bool,

    /// Scrape by category instead of by filter (the default)
    #[arg(long)]
    by_category: bool,

    /// Minimum delay between requests in seconds (overrides config)
    #[arg(long)]
    min_delay: Option<f64>,

    /// Maximum delay between requests in seconds (overrides config)
    #[arg(long)]
    max_delay: Option<f64>,

    /// Maximum concurrent requests (overrides config)
    #[arg(long)]
    max_concurrent: Option<u32>,

    /// Database file path (overrides config)
    #[arg(long)]
    database: Option<PathBuf>,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();

    if args.list_sites {
        println!("Available job sites:");
        for site in magpie_sites::available_sites() {
            println!("  - {site}");
        }
        return Ok(());
    }

    let Some(site_name) = args.site.clone() else {
        bail!("--site is required unless --list-sites is used");
    };

    let mut config = AppConfig::load_with_env().context("failed to load configuration")?;
    if let Some(database) = args.database.clone() {
        config.storage.database_path = Some(database);
    }

    run(&args, &site_name, &config).await
}

async fn run(args: &Args, site_name: &str, config: &AppConfig) -> Result<()> {
    let site_config = config.site(site_name)?.clone();
    let site = match site_name {
        "seek" => SeekSite::new(site_config.clone()),
        other => bail!("no adapter registered for site '{other}'"),
    };

    // Effective rate settings: CLI overrides win over the site's config and
    // must be in place before the first request
    let min_delay = args.min_delay.unwrap_or(site_config.min_delay);
    let max_delay = args.max_delay.unwrap_or(site_config.max_delay);
    let max_concurrent = args.max_concurrent.unwrap_or(site_config.max_concurrent);
    if min_delay < 0.0 {
        bail!("--min-delay must not be negative");
    }
    if min_delay > max_delay {
        bail!("minimum delay ({min_delay}s) must not exceed maximum delay ({max_delay}s)");
    }
    if max_concurrent == 0 {
        bail!("--max-concurrent must be at least 1");
    }
    if args.min_delay.is_some() || args.max_delay.is_some() || args.max_concurrent.is_some() {
        tracing::info!(
            min_delay,
            max_delay,
            max_concurrent,
            "Applying rate limit overrides"
        );
    }

    tracing::info!(site = site_name, "Starting job scraper");

    let database_path = config
        .database_path()
        .context("failed to resolve database path")?;
    if let Some(parent) = database_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let db = Database::new(&database_path)
        .await
        .context("failed to open database")?;
    db.run_migrations()
        .await
        .context("failed to run database migrations")?;

    let browser = BrowserEngine::launch(&config.browser)
        .await
        .context("failed to launch browser")?;

    let limiter = RateLimiter::new(min_delay, max_delay, max_concurrent);
    let scraper = Scraper::new(&browser, &db, site, limiter);

    let mode = if args.by_category {
        TraversalMode::Category
    } else {
        TraversalMode::Filter
    };

    let outcome = scraper.scrape(mode).await;
    drop(scraper);

    if let Err(e) = browser.close().await {
        tracing::warn!(error = %e, "Error closing browser");
    }
    db.close().await;

    let report = outcome.context("scrape run failed")?;
    tracing::info!(
        listings = report.listings,
        details_fetched = report.details_fetched,
        details_failed = report.details_failed,
        "Scrape complete"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_overrides_parse() {
        let args = Args::parse_from([
            "magpie",
            "--site",
            "seek",
            "--by-category",
            "--min-delay",
            "0.5",
            "--max-delay",
            "1.5",
            "--max-concurrent",
            "3",
        ]);
        assert_eq!(args.site.as_deref(), Some("seek"));
        assert!(args.by_category);
        assert_eq!(args.min_delay, Some(0.5));
        assert_eq!(args.max_delay, Some(1.5));
        assert_eq!(args.max_concurrent, Some(3));
    }
}
