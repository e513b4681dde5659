use pwakit_core::{CacheStore, Error, Request, Response};

use super::Served;

/// Always the store; never touches the network.
#[derive(Debug, Clone)]
pub struct CacheOnly {
    store: CacheStore,
}

impl CacheOnly {
    pub(crate) fn new(store: CacheStore) -> Self {
        Self { store }
    }

    pub async fn handle(&self, request: &Request) -> Result<Served, Error> {
        Ok(match self.store.lookup(&request.url).await? {
            Some(entry) => Served::cache(entry.response),
            None => Served::synthesized(Response::not_in_cache()),
        })
    }
}
