//! Genre records and the staleness check that gates refreshing them.

use super::{CatalogDb, from_epoch, to_epoch};
use crate::Error;
use chrono::{DateTime, Duration, Utc};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::OptionalExtension;

/// A stored genre.
#[derive(Debug, Clone, PartialEq)]
pub struct GenreRecord {
    pub id: i64,
    pub name: String,
    pub synopsis: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl CatalogDb {
    /// Insert or update a genre.
    ///
    /// A new row gets `created = first_seen` and `updated = last_seen`. An
    /// existing row keeps its `created` and takes the new name, synopsis and
    /// `updated`.
    pub async fn upsert_genre(
        &self, id: i64, name: &str, synopsis: &str, first_seen: DateTime<Utc>, last_seen: DateTime<Utc>,
    ) -> Result<(), Error> {
        let name = name.to_string();
        let synopsis = synopsis.to_string();
        let created = to_epoch(&first_seen);
        let updated = to_epoch(&last_seen);
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO genre (id, name, synopsis, created, updated)
                     VALUES (?1, ?2, ?3, ?4, ?5)
                     ON CONFLICT(id) DO UPDATE SET
                        name = excluded.name,
                        synopsis = excluded.synopsis,
                        updated = MAX(genre.updated, excluded.updated)",
                    params![id, name, synopsis, created, updated],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Whether the stored genre should be refreshed with the candidate values.
    ///
    /// True when no record exists, or when the record was last updated more
    /// than `max_age` before `now` and the candidate name or synopsis differs
    /// from what is stored.
    pub async fn is_stale(
        &self, genre_id: i64, now: DateTime<Utc>, max_age: Duration, candidate_name: &str, candidate_synopsis: &str,
    ) -> Result<bool, Error> {
        let Some(stored) = self.get_genre(genre_id).await? else {
            return Ok(true);
        };

        let aged = now - stored.updated > max_age;
        let changed = stored.name != candidate_name || stored.synopsis != candidate_synopsis;
        Ok(aged && changed)
    }

    /// Get a genre by id.
    pub async fn get_genre(&self, genre_id: i64) -> Result<Option<GenreRecord>, Error> {
        self.conn
            .call(move |conn| -> Result<Option<GenreRecord>, Error> {
                let record = conn
                    .query_row(
                        "SELECT id, name, synopsis, created, updated FROM genre WHERE id = ?1",
                        params![genre_id],
                        |row| {
                            Ok(GenreRecord {
                                id: row.get(0)?,
                                name: row.get(1)?,
                                synopsis: row.get(2)?,
                                created: from_epoch(row.get(3)?),
                                updated: from_epoch(row.get(4)?),
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
