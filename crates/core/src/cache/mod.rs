//! SQLite-backed HTTP response cache.
//!
//! This module provides a persistent response cache using SQLite with async
//! access via tokio-rusqlite. It supports:
//!
//! - Lookup by request URL (stored as a SHA-256 key hash)
//! - Automatic schema migrations
//! - Entries that never expire
//!
//! Which statuses are worth caching is decided by the caller.

pub mod connection;
pub mod hash;
pub mod responses;

pub use crate::Error;

pub use connection::ResponseCache;
pub use responses::CachedResponse;
