//! Genre page source backed by the persistent response cache.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use reqwest::Url;
use std::time::{Duration, Instant};

use super::FetchClient;
use super::url::genre_url;
use harvest_core::{CachedResponse, Error, ResponseCache};

/// A genre page as seen by the crawl driver.
#[derive(Debug, Clone)]
pub struct PageResponse {
    /// The resolved request URL
    pub url: Url,
    /// HTTP status code
    pub status: u16,
    /// Response body bytes
    pub body: Bytes,
    /// Wall-clock time spent producing the response
    pub elapsed: Duration,
    /// Whether the response came from the cache
    pub from_cache: bool,
}

impl PageResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Source of genre listing pages.
///
/// This allows the crawl driver to run against stubs in tests.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch the listing page for `genre_id`.
    async fn fetch(&self, genre_id: i64) -> Result<PageResponse, Error>;
}

/// Fetches genre pages over HTTP, consulting the response cache first.
///
/// Only responses whose status is in `cacheable_statuses` are stored; any
/// other status is requested again on the next run. Transport errors are
/// never cached.
pub struct CachedFetcher {
    client: FetchClient,
    cache: ResponseCache,
    base_url: String,
    cacheable_statuses: Vec<u16>,
}

impl CachedFetcher {
    pub fn new(
        client: FetchClient, cache: ResponseCache, base_url: impl Into<String>, cacheable_statuses: Vec<u16>,
    ) -> Self {
        Self { client, cache, base_url: base_url.into(), cacheable_statuses }
    }

    /// Resolve the request URL for a genre id.
    pub fn url_for(&self, genre_id: i64) -> Result<Url, Error> {
        genre_url(&self.base_url, genre_id).map_err(|e| Error::InvalidUrl(e.to_string()))
    }

    fn is_cacheable(&self, status: u16) -> bool {
        self.cacheable_statuses.contains(&status)
    }
}

#[async_trait]
impl PageSource for CachedFetcher {
    async fn fetch(&self, genre_id: i64) -> Result<PageResponse, Error> {
        let url = self.url_for(genre_id)?;
        let start = Instant::now();

        let page = match self.cache.get(url.as_str()).await? {
            Some(cached) => PageResponse {
                url,
                status: cached.status,
                body: Bytes::from(cached.body),
                elapsed: start.elapsed(),
                from_cache: true,
            },
            None => {
                let response = self.client.get(&url).await?;
                let status = response.status.as_u16();

                if self.is_cacheable(status) {
                    self.cache
                        .put(&CachedResponse {
                            url: url.to_string(),
                            status,
                            body: response.bytes.to_vec(),
                            fetched_at: Utc::now().to_rfc3339(),
                        })
                        .await?;
                }

                PageResponse { url, status, body: response.bytes, elapsed: start.elapsed(), from_cache: false }
            }
        };

        tracing::info!(
            genre_id,
            status = page.status,
            cached = page.from_cache,
            "{:2.6} - {}",
            page.elapsed.as_secs_f64(),
            page.url
        );

        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchConfig;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    /// Serves `/browse/genre/<id>` with a fixed status per id and counts hits.
    fn spawn_genre_server(statuses: HashMap<i64, u16>) -> (String, Arc<AtomicUsize>) {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start tiny_http server");
        let base_url = format!("http://{}", server.server_addr());
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);

        thread::spawn(move || {
            for request in server.incoming_requests() {
                counter.fetch_add(1, Ordering::SeqCst);
                let status = request
                    .url()
                    .rsplit('/')
                    .next()
                    .and_then(|id| id.parse::<i64>().ok())
                    .and_then(|id| statuses.get(&id).copied())
                    .unwrap_or(404);
                let body = format!("<html><body>status {status}</body></html>");
                let _ = request.respond(tiny_http::Response::from_string(body).with_status_code(status));
            }
        });

        (base_url, hits)
    }

    async fn fetcher(base_url: &str) -> CachedFetcher {
        let client = FetchClient::new(FetchConfig::default()).unwrap();
        let cache = ResponseCache::open_in_memory().await.unwrap();
        CachedFetcher::new(client, cache, base_url, vec![200, 301, 404])
    }

    #[tokio::test]
    async fn test_cacheable_status_served_from_cache() {
        let (base_url, hits) = spawn_genre_server(HashMap::from([(1, 200)]));
        let fetcher = fetcher(&base_url).await;

        let first = fetcher.fetch(1).await.unwrap();
        let second = fetcher.fetch(1).await.unwrap();

        assert_eq!(first.status, 200);
        assert!(!first.from_cache);
        assert!(second.from_cache);
        assert_eq!(second.body, first.body);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_not_found_is_cached() {
        let (base_url, hits) = spawn_genre_server(HashMap::new());
        let fetcher = fetcher(&base_url).await;

        assert_eq!(fetcher.fetch(2).await.unwrap().status, 404);
        assert_eq!(fetcher.fetch(2).await.unwrap().status, 404);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_server_error_is_refetched() {
        let (base_url, hits) = spawn_genre_server(HashMap::from([(3, 503)]));
        let fetcher = fetcher(&base_url).await;

        let first = fetcher.fetch(3).await.unwrap();
        let second = fetcher.fetch(3).await.unwrap();

        assert_eq!(first.status, 503);
        assert!(!second.from_cache);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert_eq!(fetcher.cache.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_cache_hit_needs_no_network() {
        let client = FetchClient::new(FetchConfig::default()).unwrap();
        let cache = ResponseCache::open_in_memory().await.unwrap();
        let fetcher = CachedFetcher::new(client, cache.clone(), "http://127.0.0.1:9", vec![200]);

        cache
            .put(&CachedResponse {
                url: fetcher.url_for(5).unwrap().to_string(),
                status: 200,
                body: b"<html>cached</html>".to_vec(),
                fetched_at: Utc::now().to_rfc3339(),
            })
            .await
            .unwrap();

        let page = fetcher.fetch(5).await.unwrap();
        assert!(page.from_cache);
        assert!(page.is_success());
        assert_eq!(&page.body[..], b"<html>cached</html>");
    }

    #[test]
    fn test_page_response_success_range() {
        let page = |status| PageResponse {
            url: Url::parse("https://example.com/browse/genre/1").unwrap(),
            status,
            body: Bytes::new(),
            elapsed: Duration::ZERO,
            from_cache: false,
        };
        assert!(page(200).is_success());
        assert!(page(204).is_success());
        assert!(!page(301).is_success());
        assert!(!page(404).is_success());
    }
}
