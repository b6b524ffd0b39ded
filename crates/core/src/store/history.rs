//! Visit history: one row per visited genre id.

use super::{CatalogDb, from_epoch, to_epoch};
use crate::Error;
use chrono::{DateTime, Utc};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::OptionalExtension;

/// Outcome of the most recent visit to a genre id.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRecord {
    pub id: i64,
    pub status: u16,
    pub last: DateTime<Utc>,
}

impl CatalogDb {
    /// Record that `genre_id` was visited and answered with `status`.
    ///
    /// Overwrites the previous status for the id. Runs on its own so the visit
    /// is durable even if processing the page fails later.
    pub async fn record_visit(&self, genre_id: i64, status: u16, at: DateTime<Utc>) -> Result<(), Error> {
        let last = to_epoch(&at);
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO genre_history (id, status, last)
                     VALUES (?1, ?2, ?3)
                     ON CONFLICT(id) DO UPDATE SET
                        status = excluded.status,
                        last = MAX(genre_history.last, excluded.last)",
                    params![genre_id, status, last],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Get the history record for a genre id, if it was ever visited.
    pub async fn get_history(&self, genre_id: i64) -> Result<Option<HistoryRecord>, Error> {
        self.conn
            .call(move |conn| -> Result<Option<HistoryRecord>, Error> {
                let record = conn
                    .query_row(
                        "SELECT id, status, last FROM genre_history WHERE id = ?1",
                        params![genre_id],
                        |row| {
                            Ok(HistoryRecord {
                                id: row.get(0)?,
                                status: row.get(1)?,
                                last: from_epoch(row.get(2)?),
                            })
                        },
                    )
                    .optional()?;
                Ok(record)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Relation;
    use chrono::Duration;

    #[tokio::test]
    async fn test_record_visit_inserts() {
        let db = CatalogDb::open_in_memory().await.unwrap();
        let now = Utc::now();

        db.record_visit(42, 404, now).await.unwrap();

        let record = db.get_history(42).await.unwrap().unwrap();
        assert_eq!(record.status, 404);
        assert_eq!(record.last, from_epoch(to_epoch(&now)));
    }

    #[tokio::test]
    async fn test_record_visit_last_write_wins() {
        let db = CatalogDb::open_in_memory().await.unwrap();
        let first = Utc::now();
        let second = first + Duration::seconds(5);

        db.record_visit(7, 500, first).await.unwrap();
        db.record_visit(7, 200, second).await.unwrap();

        let record = db.get_history(7).await.unwrap().unwrap();
        assert_eq!(record.status, 200);
        assert_eq!(record.last, from_epoch(to_epoch(&second)));
        assert_eq!(db.count_rows(Relation::History).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_record_visit_never_moves_last_backwards() {
        let db = CatalogDb::open_in_memory().await.unwrap();
        let later = Utc::now();
        let earlier = later - Duration::hours(1);

        db.record_visit(9, 200, later).await.unwrap();
        db.record_visit(9, 301, earlier).await.unwrap();

        let record = db.get_history(9).await.unwrap().unwrap();
        assert_eq!(record.status, 301);
        assert_eq!(record.last, from_epoch(to_epoch(&later)));
    }

    #[tokio::test]
    async fn test_get_history_missing() {
        let db = CatalogDb::open_in_memory().await.unwrap();
        assert!(db.get_history(1).await.unwrap().is_none());
    }
}
