//! Core types and shared functionality for genre-harvest.
//!
//! This crate provides:
//! - Catalog store (genres, titles, memberships, visit history) with SQLite backend
//! - Persistent HTTP response cache
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
mod migrations;
pub mod store;

pub use cache::{CachedResponse, ResponseCache};
pub use config::{AppConfig, ConfigError, RefreshPolicy};
pub use error::Error;
pub use store::{CatalogDb, GenreRecord, HistoryRecord, MembershipRow, TitleRow};
