//! Titles and genre memberships.
//!
//! Memberships are append/refresh only: a title that disappears from a genre
//! listing keeps its old `genre_title` row.

use super::{CatalogDb, from_epoch, to_epoch};
use crate::Error;
use chrono::{DateTime, Utc};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::{self, OptionalExtension};

/// A title as stored in the `title` relation.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleRow {
    pub id: i64,
    pub name: String,
    pub img_src: String,
    pub last: DateTime<Utc>,
}

/// A `(genre_id, title_id)` pair as stored in the `genre_title` relation.
#[derive(Debug, Clone, PartialEq)]
pub struct MembershipRow {
    pub genre_id: i64,
    pub title_id: i64,
    pub last: DateTime<Utc>,
}

fn write_titles(conn: &rusqlite::Connection, rows: &[TitleRow]) -> Result<(), rusqlite::Error> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO title (id, name, img_src, last)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            img_src = excluded.img_src,
            last = MAX(title.last, excluded.last)",
    )?;
    for row in rows {
        stmt.execute(params![row.id, row.name, row.img_src, to_epoch(&row.last)])?;
    }
    Ok(())
}

fn write_memberships(conn: &rusqlite::Connection, rows: &[MembershipRow]) -> Result<(), rusqlite::Error> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO genre_title (genre_id, title_id, last)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(genre_id, title_id) DO UPDATE SET
            last = MAX(genre_title.last, excluded.last)",
    )?;
    for row in rows {
        stmt.execute(params![row.genre_id, row.title_id, to_epoch(&row.last)])?;
    }
    Ok(())
}

impl CatalogDb {
    /// Insert or update a batch of titles in one transaction.
    pub async fn upsert_titles(&self, rows: &[TitleRow]) -> Result<(), Error> {
        let rows = rows.to_vec();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                write_titles(&tx, &rows)?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Insert or update a batch of genre memberships in one transaction.
    pub async fn upsert_memberships(&self, rows: &[MembershipRow]) -> Result<(), Error> {
        let rows = rows.to_vec();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                write_memberships(&tx, &rows)?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Upsert the titles listed on one genre page together with their
    /// memberships in that genre.
    ///
    /// Both batches commit in the same transaction. Each membership carries
    /// the `last` stamp of its title row.
    pub async fn upsert_listing(&self, genre_id: i64, titles: Vec<TitleRow>) -> Result<(), Error> {
        let memberships: Vec<MembershipRow> = titles
            .iter()
            .map(|t| MembershipRow { genre_id, title_id: t.id, last: t.last })
            .collect();

        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                write_titles(&tx, &titles)?;
                write_memberships(&tx, &memberships)?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Get a title by id.
    pub async fn get_title(&self, title_id: i64) -> Result<Option<TitleRow>, Error> {
        self.conn
            .call(move |conn| -> Result<Option<TitleRow>, Error> {
                let row = conn
                    .query_row(
                        "SELECT id, name, img_src, last FROM title WHERE id = ?1",
                        params![title_id],
                        |row| {
                            Ok(TitleRow {
                                id: row.get(0)?,
                                name: row.get(1)?,
                                img_src: row.get(2)?,
                                last: from_epoch(row.get(3)?),
                            })
                        },
                    )
                    .optional()?;
                Ok(row)
            })
            .await
            .map_err(Error::from)
    }

    /// Get a single membership row.
    pub async fn get_membership(&self, genre_id: i64, title_id: i64) -> Result<Option<MembershipRow>, Error> {
        self.conn
            .call(move |conn| -> Result<Option<MembershipRow>, Error> {
                let row = conn
                    .query_row(
                        "SELECT genre_id, title_id, last FROM genre_title
                         WHERE genre_id = ?1 AND title_id = ?2",
                        params![genre_id, title_id],
                        |row| {
                            Ok(MembershipRow {
                                genre_id: row.get(0)?,
                                title_id: row.get(1)?,
                                last: from_epoch(row.get(2)?),
                            })
                        },
                    )
                    .optional()?;
                Ok(row)
            })
            .await
            .map_err(Error::from)
    }

    /// Ids of every genre a title has been listed under, ascending.
    pub async fn genres_for_title(&self, title_id: i64) -> Result<Vec<i64>, Error> {
        self.conn
            .call(move |conn| -> Result<Vec<i64>, Error> {
                let mut stmt =
                    conn.prepare("SELECT genre_id FROM genre_title WHERE title_id = ?1 ORDER BY genre_id")?;
                let ids = stmt
                    .query_map(params![title_id], |row| row.get(0))?
                    .collect::<Result<Vec<i64>, _>>()?;
                Ok(ids)
            })
            .await
            .map_err(Error::from)
    }
}
