//! Cached response reads and writes.

use super::connection::ResponseCache;
use super::hash::compute_cache_key;
use crate::Error;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A cached HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    pub url: String,
    pub status: u16,
    pub body: Vec<u8>,
    /// RFC 3339 timestamp of the original network fetch.
    pub fetched_at: String,
}

impl ResponseCache {
    /// Look up the cached response for a request URL.
    ///
    /// Returns None if the URL has never been stored.
    pub async fn get(&self, url: &str) -> Result<Option<CachedResponse>, Error> {
        let key_hash = compute_cache_key(url);
        self.conn
            .call(move |conn| -> Result<Option<CachedResponse>, Error> {
                let mut stmt =
                    conn.prepare("SELECT url, status, body, fetched_at FROM responses WHERE key_hash = ?1")?;

                let result = stmt.query_row(params![key_hash], |row| {
                    Ok(CachedResponse {
                        url: row.get(0)?,
                        status: row.get(1)?,
                        body: row.get(2)?,
                        fetched_at: row.get(3)?,
                    })
                });

                match result {
                    Ok(r) => Ok(Some(r)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Insert or replace the cached response for its URL.
    pub async fn put(&self, response: &CachedResponse) -> Result<(), Error> {
        let response = response.clone();
        let key_hash = compute_cache_key(&response.url);
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO responses (key_hash, url, status, body, fetched_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)
                     ON CONFLICT(key_hash) DO UPDATE SET
                        url = excluded.url,
                        status = excluded.status,
                        body = excluded.body,
                        fetched_at = excluded.fetched_at",
                    params![key_hash, response.url, response.status, response.body, response.fetched_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Number of cached responses.
    pub async fn count(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM responses", [], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_response(url: &str, status: u16) -> CachedResponse {
        CachedResponse {
            url: url.to_string(),
            status,
            body: b"<html></html>".to_vec(),
            fetched_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let cache = ResponseCache::open_in_memory().await.unwrap();
        let response = make_response("https://example.com/browse/genre/7", 200);

        cache.put(&response).await.unwrap();

        let retrieved = cache.get(&response.url).await.unwrap().unwrap();
        assert_eq!(retrieved, response);
    }

    #[tokio::test]
    async fn test_get_missing() {
        let cache = ResponseCache::open_in_memory().await.unwrap();
        let result = cache.get("https://example.com/browse/genre/1").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_put_replaces_existing() {
        let cache = ResponseCache::open_in_memory().await.unwrap();
        let url = "https://example.com/browse/genre/3";
        cache.put(&make_response(url, 404)).await.unwrap();
        cache.put(&make_response(url, 200)).await.unwrap();

        assert_eq!(cache.count().await.unwrap(), 1);
        assert_eq!(cache.get(url).await.unwrap().unwrap().status, 200);
    }
}
