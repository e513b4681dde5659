//! Entry operations on one named store.
//!
//! Provides lookup, write (with optional freshness marker and FIFO bound),
//! bulk write, delete and enumeration for a single logical store.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use std::sync::Arc;
use tokio_rusqlite::{params, rusqlite};
use url::Url;

use super::connection::CacheDb;
use super::hash::request_key;
use super::lifecycle::{is_expired, trim_store};
use crate::{Error, Response};

/// Handle to one named store.
///
/// Cheap to clone; every clone addresses the same rows.
#[derive(Clone, Debug)]
pub struct CacheStore {
    db: CacheDb,
    name: Arc<str>,
}

/// How a write should be recorded.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOptions {
    /// Freshness marker; `None` writes an entry that never expires.
    pub written_at: Option<DateTime<Utc>>,
    /// FIFO bound applied in the same transaction as the write.
    pub max_entries: Option<usize>,
}

/// A response read back from a store, with its freshness marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    pub response: Response,
    pub written_at: Option<DateTime<Utc>>,
}

impl CachedResponse {
    /// Whether the entry is too old to satisfy a cache-first lookup.
    pub fn is_expired(&self, max_age: std::time::Duration, now: DateTime<Utc>) -> bool {
        is_expired(self.written_at, max_age, now)
    }
}

struct Row {
    key: String,
    url: String,
    status: u16,
    headers_json: String,
    body: Vec<u8>,
    final_url: Option<String>,
    written_at: Option<i64>,
}

impl Row {
    fn encode(url: &Url, response: &Response, written_at: Option<DateTime<Utc>>) -> Result<Self, Error> {
        let headers: Vec<(&str, &[u8])> = response
            .headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_bytes()))
            .collect();
        let headers_json = serde_json::to_string(&headers).map_err(|e| Error::CorruptEntry(e.to_string()))?;

        Ok(Self {
            key: request_key(url),
            url: url.to_string(),
            status: response.status.as_u16(),
            headers_json,
            body: response.body.to_vec(),
            final_url: response.url.clone(),
            written_at: written_at.map(|t| t.timestamp_millis()),
        })
    }

    fn decode(self) -> Result<CachedResponse, Error> {
        let status = StatusCode::from_u16(self.status).map_err(|e| Error::CorruptEntry(e.to_string()))?;
        let pairs: Vec<(String, Vec<u8>)> =
            serde_json::from_str(&self.headers_json).map_err(|e| Error::CorruptEntry(e.to_string()))?;

        let mut headers = HeaderMap::with_capacity(pairs.len());
        for (name, value) in pairs {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| Error::CorruptEntry(e.to_string()))?;
            let value = HeaderValue::from_bytes(&value).map_err(|e| Error::CorruptEntry(e.to_string()))?;
            headers.append(name, value);
        }

        Ok(CachedResponse {
            response: Response { status, headers, body: Bytes::from(self.body), url: self.final_url },
            written_at: self.written_at.and_then(DateTime::from_timestamp_millis),
        })
    }

    fn insert(&self, conn: &rusqlite::Connection, store: &str) -> rusqlite::Result<()> {
        // Overwrites delete first so the key takes the newest insertion slot.
        conn.execute("DELETE FROM entries WHERE store = ?1 AND key = ?2", params![store, &self.key])?;
        conn.execute(
            "INSERT INTO entries (store, key, url, status, headers_json, body, final_url, written_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                store,
                &self.key,
                &self.url,
                self.status,
                &self.headers_json,
                &self.body,
                &self.final_url,
                self.written_at,
            ],
        )?;
        Ok(())
    }
}

impl CacheStore {
    pub(crate) fn new(db: CacheDb, name: String) -> Self {
        Self { db, name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn db(&self) -> &CacheDb {
        &self.db
    }

    /// Look up the entry stored for a request URL.
    ///
    /// Returns None if nothing is stored under that key.
    pub async fn lookup(&self, url: &Url) -> Result<Option<CachedResponse>, Error> {
        let store = self.name.to_string();
        let key = request_key(url);
        let row = self
            .db
            .conn
            .call(move |conn| -> Result<Option<Row>, Error> {
                let result = conn.query_row(
                    "SELECT key, url, status, headers_json, body, final_url, written_at
                     FROM entries WHERE store = ?1 AND key = ?2",
                    params![store, key],
                    |row| {
                        Ok(Row {
                            key: row.get(0)?,
                            url: row.get(1)?,
                            status: row.get(2)?,
                            headers_json: row.get(3)?,
                            body: row.get(4)?,
                            final_url: row.get(5)?,
                            written_at: row.get(6)?,
                        })
                    },
                );

                match result {
                    Ok(row) => Ok(Some(row)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        row.map(Row::decode).transpose()
    }

    /// Store a response for a request URL.
    ///
    /// When `max_entries` is set, the FIFO bound is applied in the same
    /// transaction, so readers never see the store above its bound.
    /// Returns the number of entries evicted.
    pub async fn put(&self, url: &Url, response: &Response, options: WriteOptions) -> Result<u64, Error> {
        let store = self.name.to_string();
        let row = Row::encode(url, response, options.written_at)?;
        self.db
            .conn
            .call(move |conn| -> Result<u64, Error> {
                let tx = conn.transaction()?;
                row.insert(&tx, &store)?;
                let evicted = match options.max_entries {
                    Some(max) => trim_store(&tx, &store, max)?,
                    None => 0,
                };
                tx.commit()?;
                Ok(evicted)
            })
            .await
            .map_err(Error::from)
    }

    /// Store many responses in one transaction: all of them or none.
    pub async fn put_all(&self, items: &[(Url, Response)]) -> Result<(), Error> {
        let store = self.name.to_string();
        let rows = items
            .iter()
            .map(|(url, response)| Row::encode(url, response, None))
            .collect::<Result<Vec<_>, _>>()?;
        self.db
            .conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                for row in &rows {
                    row.insert(&tx, &store)?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Delete the entry for a request URL. Returns whether one existed.
    pub async fn delete(&self, url: &Url) -> Result<bool, Error> {
        let store = self.name.to_string();
        let key = request_key(url);
        self.db
            .conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute("DELETE FROM entries WHERE store = ?1 AND key = ?2", params![store, key])?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Request URLs in insertion order, oldest first.
    pub async fn urls(&self) -> Result<Vec<String>, Error> {
        let store = self.name.to_string();
        self.db
            .conn
            .call(move |conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT url FROM entries WHERE store = ?1 ORDER BY seq ASC")?;
                let urls = stmt
                    .query_map(params![store], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(urls)
            })
            .await
            .map_err(Error::from)
    }

    pub async fn len(&self) -> Result<usize, Error> {
        let store = self.name.to_string();
        self.db
            .conn
            .call(move |conn| -> Result<usize, Error> {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM entries WHERE store = ?1", params![store], |row| row.get(0))?;
                Ok(count as usize)
            })
            .await
            .map_err(Error::from)
    }

    pub async fn is_empty(&self) -> Result<bool, Error> {
        Ok(self.len().await? == 0)
    }

    /// Remove every entry of this store. Returns the number deleted.
    pub async fn clear(&self) -> Result<u64, Error> {
        let store = self.name.to_string();
        self.db
            .conn
            .call(move |conn| -> Result<u64, Error> {
                let deleted = conn.execute("DELETE FROM entries WHERE store = ?1", params![store])?;
                Ok(deleted as u64)
            })
            .await
            .map_err(Error::from)
    }
}
