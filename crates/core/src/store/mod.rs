//! SQLite-backed catalog store.
//!
//! Owns the four catalog relations:
//!
//! - `genre`: genre metadata with first-seen and last-updated timestamps
//! - `genre_history`: last observed status per visited id
//! - `title`: content items seen on any genre page
//! - `genre_title`: which titles were listed under which genre
//!
//! Every write group (history, genre, title+membership batch) commits as a
//! single transaction. Timestamps are stored as fractional unix seconds and
//! only ever move forward per key.

pub mod connection;
pub mod genres;
pub mod history;
pub mod titles;

use chrono::{DateTime, Utc};

pub use connection::CatalogDb;
pub use genres::GenreRecord;
pub use history::HistoryRecord;
pub use titles::{MembershipRow, TitleRow};

/// The catalog relations, for row counting and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Genre,
    History,
    Title,
    Membership,
}

impl Relation {
    pub(crate) fn table(self) -> &'static str {
        match self {
            Relation::Genre => "genre",
            Relation::History => "genre_history",
            Relation::Title => "title",
            Relation::Membership => "genre_title",
        }
    }
}

pub(crate) fn to_epoch(at: &DateTime<Utc>) -> f64 {
    at.timestamp_micros() as f64 / 1_000_000.0
}

pub(crate) fn from_epoch(secs: f64) -> DateTime<Utc> {
    DateTime::from_timestamp_micros((secs * 1_000_000.0).round() as i64).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_round_trip_keeps_micros() {
        let at = DateTime::parse_from_rfc3339("2024-03-01T12:30:45.123456Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(from_epoch(to_epoch(&at)), at);
    }
}
