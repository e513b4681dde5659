//! Core types and shared functionality for pwakit.
//!
//! This crate provides:
//! - Route patterns and caching rules
//! - Request/response exchange types and the network seam
//! - Named response stores with a SQLite backend
//! - The program synthesizer (config -> executable route program)
//! - Unified error types and configuration

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod exchange;
pub mod network;
pub mod pattern;
pub mod program;
pub mod rule;

pub use cache::{CacheDb, CacheStore, CachedResponse, WriteOptions};
pub use clock::{Clock, SystemClock};
pub use error::Error;
pub use exchange::{Request, Response};
pub use network::Network;
pub use pattern::{Pattern, PatternError};
pub use program::{CompiledRoute, PRECACHE_NAME, Program};
pub use rule::{Rule, StrategyKind};
