//! HTTP fetch pipeline with a persistent response cache.
//!
//! ### Client
//! - Built from an explicit [`FetchConfig`]; no process-wide session state.
//! - Every HTTP status is returned to the caller; only transport failures
//!   (timeouts, resets, DNS) are errors.
//!
//! ### Cache
//! - [`CachedFetcher`] serves genre pages from the response cache when the
//!   resolved URL was fetched before with a cacheable status.
//! - Entries never expire, which makes re-running an id range cheap.

pub mod cached;
pub mod url;

use bytes::Bytes;
use reqwest::{Client, StatusCode, Url};
use std::time::{Duration, Instant};

pub use cached::{CachedFetcher, PageResponse, PageSource};
pub use url::{UrlError, genre_url};

use harvest_core::{AppConfig, Error};

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string sent with every request
    pub user_agent: String,

    /// Request timeout; `None` leaves the client default (no timeout)
    pub timeout: Option<Duration>,

    /// Maximum number of redirects to follow (default: 10)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        let app = AppConfig::default();
        Self { user_agent: app.user_agent, timeout: None, max_redirects: app.max_redirects }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self { user_agent: config.user_agent.clone(), timeout: config.timeout(), max_redirects: config.max_redirects }
    }
}

/// Response from a fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The URL requested
    pub url: Url,
    /// The final URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status: StatusCode,
    /// Response body bytes
    pub bytes: Bytes,
    /// Wall-clock time around the request
    pub elapsed: Duration,
}

/// HTTP fetch client.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true);

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let http = builder
            .build()
            .map_err(|e| Error::HttpClient(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Issue a GET for `url`, returning the body whatever the status.
    pub async fn get(&self, url: &Url) -> Result<FetchResponse, Error> {
        let start = Instant::now();

        let response = self
            .http
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| Error::Transport(format!("{url}: {e}")))?;

        let status = response.status();
        let final_url = response.url().clone();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Transport(format!("{url}: failed to read response: {e}")))?;

        let elapsed = start.elapsed();

        tracing::debug!(
            "fetched {} -> {} ({}) in {}ms ({} bytes)",
            url,
            final_url,
            status.as_u16(),
            elapsed.as_millis(),
            bytes.len()
        );

        Ok(FetchResponse { url: url.clone(), final_url, status, bytes, elapsed })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert!(config.user_agent.starts_with("Mozilla/5.0"));
        assert_eq!(config.timeout, None);
        assert_eq!(config.max_redirects, 10);
    }

    #[test]
    fn test_fetch_config_from_app_config() {
        let app = AppConfig { user_agent: "harvest-test/1.0".into(), timeout_ms: Some(2_000), ..Default::default() };
        let config = FetchConfig::from(&app);
        assert_eq!(config.user_agent, "harvest-test/1.0");
        assert_eq!(config.timeout, Some(Duration::from_secs(2)));
    }

    #[tokio::test]
    async fn test_fetch_client_new() {
        let client = FetchClient::new(FetchConfig::default()).unwrap();
        assert_eq!(client.config().max_redirects, 10);
    }

    #[tokio::test]
    async fn test_get_connection_refused_is_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = FetchClient::new(FetchConfig::default()).unwrap();
        let url = Url::parse(&format!("http://127.0.0.1:{port}/browse/genre/1")).unwrap();
        let result = client.get(&url).await;
        assert!(matches!(result, Err(Error::Transport(_))));
    }
}
