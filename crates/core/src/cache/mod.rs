//! SQLite-backed named response stores.
//!
//! This module provides persistent key -> response stores using SQLite
//! with async access via tokio-rusqlite. It supports:
//!
//! - Many logical stores in one database, addressed through [`CacheStore`] handles
//! - Request keys derived from SHA-256 of the canonical URL
//! - Freshness markers and FIFO size bounds ([`lifecycle`])
//! - Automatic schema migrations and WAL mode

pub mod connection;
pub mod entries;
pub mod hash;
pub mod lifecycle;
pub mod migrations;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::{CacheStore, CachedResponse, WriteOptions};
