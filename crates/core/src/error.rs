//! Unified error types for genre-harvest.
//!
//! Everything here is fatal for the current run. Non-success HTTP statuses and
//! unparsable pages are normal crawl outcomes and never surface as `Error`.

use tokio_rusqlite::rusqlite;

/// Unified error type shared by the store, cache and fetch layers.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Database operation failed.
    #[error("STORE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("STORE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// The request could not be completed (timeout, connection reset, DNS).
    #[error("TRANSPORT_ERROR: {0}")]
    Transport(String),

    /// The HTTP client could not be built.
    #[error("HTTP_CLIENT_ERROR: {0}")]
    HttpClient(String),
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Transport("connection reset".to_string());
        assert!(err.to_string().contains("TRANSPORT_ERROR"));
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn test_from_rusqlite_error() {
        let err: Error = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, Error::Database(_)));
        assert!(err.to_string().starts_with("STORE_ERROR"));
    }

    #[test]
    fn test_unwrap_nested_error() {
        let nested = tokio_rusqlite::Error::Error(Error::MigrationFailed("bad version".into()));
        let err: Error = nested.into();
        assert!(matches!(err, Error::MigrationFailed(msg) if msg == "bad version"));
    }
}
