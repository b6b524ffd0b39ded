//! Client code for genre-harvest.
//!
//! This crate provides the HTTP fetch pipeline with its response cache, genre
//! page parsing, and the crawl driver that ties them to the catalog store.

pub mod crawl;
pub mod fetch;
pub mod parse;

pub use crawl::{CrawlPolicy, CrawlSummary, Crawler, GenreIds, VisitOutcome};
pub use fetch::{CachedFetcher, FetchClient, FetchConfig, FetchResponse, PageResponse, PageSource};
pub use parse::{GenrePage, PageParser, ParseError, ScraperParser, TitleEntry};
