//! genre-harvest entry point.
//!
//! Walks the genre id space from the given start id, storing every visit,
//! genre and title in the local catalog. Re-running over an already crawled
//! range is cheap: cached responses are served from the response cache.

use anyhow::{Context, Result};
use clap::Parser;
use harvest_client::{CachedFetcher, CrawlPolicy, Crawler, FetchClient, FetchConfig, GenreIds, ScraperParser};
use harvest_core::{AppConfig, CatalogDb, ResponseCache};

mod cli;
mod logging;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    logging::init(args.log_json)?;

    let config = AppConfig::load().context("load configuration")?;
    let end_id = args.end_id.unwrap_or(config.end_id);

    tracing::info!(
        start_id = args.start_id,
        end_id,
        catalog = %config.catalog_db_path.display(),
        cache = %config.cache_db_path.display(),
        refresh_policy = ?config.refresh_policy,
        "starting genre crawl"
    );

    let store = CatalogDb::open(&config.catalog_db_path)
        .await
        .with_context(|| format!("open catalog {}", config.catalog_db_path.display()))?;
    let cache = ResponseCache::open(&config.cache_db_path)
        .await
        .with_context(|| format!("open response cache {}", config.cache_db_path.display()))?;

    let client = FetchClient::new(FetchConfig::from(&config))?;
    let fetcher = CachedFetcher::new(client, cache, config.base_url.clone(), config.cacheable_statuses.clone());
    let crawler = Crawler::new(fetcher, ScraperParser::new(), store, CrawlPolicy::from(&config));

    let ids = GenreIds::new(args.start_id, end_id);
    let summary = crawler.run(ids).await?;

    if summary.items_skipped > 0 {
        tracing::warn!(items_skipped = summary.items_skipped, "some title items could not be extracted");
    }

    Ok(())
}
