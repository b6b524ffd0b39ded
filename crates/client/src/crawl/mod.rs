//! Crawl driver.
//!
//! Each genre id walks the same sequence:
//!
//! 1. Fetch the page (cache first) and capture `now` once.
//! 2. Record the visit in `genre_history`, whatever the status.
//! 3. Non-2xx: skip.
//! 4. Parse; unparsable genre metadata: skip.
//! 5. Refresh the genre record if the policy allows.
//! 6. Upsert titles and memberships as one batch.
//!
//! All writes for an id commit before the next id is fetched. Errors are not
//! retried; they end the run and the crawl is resumed by re-running from the
//! same or an earlier start id.

mod ids;

use chrono::{Duration, Utc};
use harvest_core::{AppConfig, CatalogDb, Error, RefreshPolicy, TitleRow};

use crate::fetch::PageSource;
use crate::parse::{PageParser, ParseError};

pub use ids::GenreIds;

/// When and how genre records are refreshed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlPolicy {
    pub max_age: Duration,
    pub refresh: RefreshPolicy,
}

impl Default for CrawlPolicy {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for CrawlPolicy {
    fn from(config: &AppConfig) -> Self {
        Self { max_age: config.max_age(), refresh: config.refresh_policy }
    }
}

/// What happened to a single genre id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisitOutcome {
    /// The server answered with a non-2xx status.
    Skipped { status: u16 },
    /// The page had no usable genre metadata.
    Unparsable { reason: ParseError },
    /// The page was parsed and its titles stored.
    Harvested { found: usize, skipped: usize, genre_refreshed: bool },
}

/// Totals over a crawl run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    pub visited: u64,
    pub skipped: u64,
    pub unparsable: u64,
    pub harvested: u64,
    pub genres_refreshed: u64,
    pub titles_found: u64,
    pub items_skipped: u64,
}

impl CrawlSummary {
    fn record(&mut self, outcome: &VisitOutcome) {
        self.visited += 1;
        match outcome {
            VisitOutcome::Skipped { .. } => self.skipped += 1,
            VisitOutcome::Unparsable { .. } => self.unparsable += 1,
            VisitOutcome::Harvested { found, skipped, genre_refreshed } => {
                self.harvested += 1;
                self.titles_found += *found as u64;
                self.items_skipped += *skipped as u64;
                if *genre_refreshed {
                    self.genres_refreshed += 1;
                }
            }
        }
    }
}

/// Sequential crawler over the genre id space.
pub struct Crawler<S, P> {
    source: S,
    parser: P,
    store: CatalogDb,
    policy: CrawlPolicy,
}

impl<S: PageSource, P: PageParser> Crawler<S, P> {
    pub fn new(source: S, parser: P, store: CatalogDb, policy: CrawlPolicy) -> Self {
        Self { source, parser, store, policy }
    }

    /// Visit every id in `ids`, in order.
    ///
    /// Stops at the first error, leaving everything committed so far in place.
    pub async fn run(&self, ids: GenreIds) -> Result<CrawlSummary, Error> {
        let mut summary = CrawlSummary::default();

        for genre_id in ids {
            let outcome = self.visit(genre_id).await?;
            summary.record(&outcome);
        }

        tracing::info!(
            visited = summary.visited,
            skipped = summary.skipped,
            unparsable = summary.unparsable,
            harvested = summary.harvested,
            genres_refreshed = summary.genres_refreshed,
            titles_found = summary.titles_found,
            items_skipped = summary.items_skipped,
            "crawl finished"
        );

        Ok(summary)
    }

    /// Fetch, log, parse and store a single genre id.
    pub async fn visit(&self, genre_id: i64) -> Result<VisitOutcome, Error> {
        let response = self.source.fetch(genre_id).await?;
        let now = Utc::now();

        self.store.record_visit(genre_id, response.status, now).await?;

        if !response.is_success() {
            tracing::debug!(genre_id, status = response.status, "skipping non-success response");
            return Ok(VisitOutcome::Skipped { status: response.status });
        }

        let page = match self.parser.parse(&response.body) {
            Ok(page) => page,
            Err(reason) => {
                tracing::warn!(genre_id, %reason, "Skipping genre id: {}", genre_id);
                return Ok(VisitOutcome::Unparsable { reason });
            }
        };

        let genre_refreshed = match self.policy.refresh {
            RefreshPolicy::Always => true,
            RefreshPolicy::Stale => {
                self.store
                    .is_stale(genre_id, now, self.policy.max_age, &page.name, &page.synopsis)
                    .await?
            }
        };

        if genre_refreshed {
            self.store
                .upsert_genre(genre_id, &page.name, &page.synopsis, now, now)
                .await?;
        }

        let found = page.found();
        let rows: Vec<TitleRow> = page
            .titles
            .into_iter()
            .map(|t| TitleRow { id: t.id, name: t.name, img_src: t.img_src, last: now })
            .collect();
        self.store.upsert_listing(genre_id, rows).await?;

        tracing::info!(
            genre_id,
            "Found {}, skipped partial items {} on {} ({})",
            found,
            page.skipped,
            page.name,
            response.url
        );

        Ok(VisitOutcome::Harvested { found, skipped: page.skipped, genre_refreshed })
    }

    /// The catalog this crawler writes to.
    pub fn store(&self) -> &CatalogDb {
        &self.store
    }
}
