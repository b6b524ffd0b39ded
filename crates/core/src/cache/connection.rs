//! Response cache connection management.

use crate::{Error, migrations};
use std::path::Path;
use tokio_rusqlite::Connection;

const PRAGMAS: &str = "PRAGMA journal_mode=WAL;
     PRAGMA synchronous=NORMAL;
     PRAGMA temp_store=MEMORY;";

/// Response cache handle.
///
/// Wraps a tokio-rusqlite Connection that runs database operations
/// on a background thread. Kept in its own database file, separate from
/// the catalog store.
#[derive(Clone, Debug)]
pub struct ResponseCache {
    pub(crate) conn: Connection,
}

impl ResponseCache {
    /// Open a cache database at the specified path.
    ///
    /// Creates the file if it doesn't exist, applies pragmas, and runs any
    /// pending migrations.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let conn = Connection::open(path).await.map_err(|e| Error::Database(e.into()))?;
        Self::init(conn).await
    }

    /// Open an in-memory cache for testing.
    pub async fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| Error::Database(e.into()))?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self, Error> {
        conn.call(|conn| {
            conn.execute_batch(PRAGMAS)?;
            Ok(())
        })
        .await
        .map_err(Error::Database)?;

        migrations::run(&conn, migrations::RESPONSE_CACHE).await?;

        Ok(Self { conn })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_in_memory() {
        let cache = ResponseCache::open_in_memory().await.unwrap();
        let count: i64 = cache
            .conn
            .call(|conn| conn.query_row("SELECT COUNT(*) FROM responses", [], |row| row.get(0)))
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
