//! Freshness and size-bound policy shared by every strategy.
//!
//! - Freshness: an entry written with a marker at `T` is expired once
//!   `now - T > max_age`. Expiry never deletes; it only disqualifies the entry
//!   from satisfying a cache-first lookup.
//! - Eviction: after a write into a bounded store, delete the oldest entries
//!   (by insertion order) until the store is at or below its bound. Reads do
//!   not reorder anything.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio_rusqlite::{params, rusqlite};

use super::entries::CacheStore;
use crate::Error;

/// Check an entry's freshness marker against a max-age.
///
/// Entries without a marker never expire.
pub fn is_expired(written_at: Option<DateTime<Utc>>, max_age: Duration, now: DateTime<Utc>) -> bool {
    let Some(written_at) = written_at else {
        return false;
    };
    let age = now.signed_duration_since(written_at);
    chrono::Duration::from_std(max_age).is_ok_and(|max| age > max)
}

/// Delete the oldest entries of `store` until at most `max_entries` remain.
///
/// Runs on whatever connection or transaction the caller holds, so a write
/// and its eviction can commit together.
pub(crate) fn trim_store(conn: &rusqlite::Connection, store: &str, max_entries: usize) -> rusqlite::Result<u64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM entries WHERE store = ?1", params![store], |row| {
        row.get(0)
    })?;
    let max = max_entries as i64;
    if count <= max {
        return Ok(0);
    }

    let to_delete = count - max;
    let deleted = conn.execute(
        "DELETE FROM entries WHERE store = ?1 AND seq IN (
            SELECT seq FROM entries WHERE store = ?1 ORDER BY seq ASC LIMIT ?2
        )",
        params![store, to_delete],
    )?;
    Ok(deleted as u64)
}

impl CacheStore {
    /// Apply the FIFO bound outside of a write.
    ///
    /// Returns the number of evicted entries.
    pub async fn trim(&self, max_entries: usize) -> Result<u64, Error> {
        let store = self.name().to_string();
        self.db()
            .conn
            .call(move |conn| -> Result<u64, Error> { Ok(trim_store(conn, &store, max_entries)?) })
            .await
            .map_err(Error::from)
    }
}
