//! Store inspection and purge tools.

pub mod keys;
pub mod purge;

use pwakit_core::{CacheStore, Error};
use pwakit_worker::Worker;

pub use keys::{CacheKeysParams, keys_impl};
pub use purge::{CachePurgeParams, purge_impl};

fn store<'a>(worker: &'a Worker, name: &str) -> Result<&'a CacheStore, Error> {
    worker.store(name).ok_or_else(|| Error::UnknownCache(name.to_string()))
}
