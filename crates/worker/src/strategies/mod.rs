//! Strategy executors.
//!
//! Each executor takes one request and resolves to one response, suspending
//! only on network or store I/O. Network failures are absorbed according to
//! the strategy's fallback policy; store failures surface as `Err` and the
//! dispatcher turns them into a synthesized response.

mod cache_first;
mod cache_only;
mod network_first;
mod network_only;
mod stale_while_revalidate;

use std::sync::Arc;
use std::time::Duration;

use pwakit_core::{CacheStore, Clock, CompiledRoute, Error, Network, Request, Response, StrategyKind, WriteOptions};
use url::Url;

use crate::background::Background;

pub use cache_first::CacheFirst;
pub use cache_only::CacheOnly;
pub use network_first::NetworkFirst;
pub use network_only::NetworkOnly;
pub use stale_while_revalidate::StaleWhileRevalidate;

/// Shared collaborators every executor runs against.
#[derive(Clone)]
pub struct Context {
    pub network: Arc<dyn Network>,
    pub clock: Arc<dyn Clock>,
    pub background: Background,
}

impl Context {
    pub fn new(network: Arc<dyn Network>, clock: Arc<dyn Clock>) -> Self {
        Self { network, clock, background: Background::new() }
    }
}

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Network,
    Cache,
    Synthesized,
}

impl Source {
    pub fn as_str(self) -> &'static str {
        match self {
            Source::Network => "network",
            Source::Cache => "cache",
            Source::Synthesized => "synthesized",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Served {
    pub response: Response,
    pub source: Source,
}

impl Served {
    pub(crate) fn network(response: Response) -> Self {
        Self { response, source: Source::Network }
    }

    pub(crate) fn cache(response: Response) -> Self {
        Self { response, source: Source::Cache }
    }

    pub(crate) fn synthesized(response: Response) -> Self {
        Self { response, source: Source::Synthesized }
    }
}

/// A store plus the write policy a route applies to it.
#[derive(Debug, Clone)]
pub(crate) struct Persist {
    pub(crate) store: CacheStore,
    pub(crate) max_age: Option<Duration>,
    pub(crate) max_entries: Option<usize>,
}

impl Persist {
    fn for_route(route: &CompiledRoute, store: CacheStore) -> Self {
        Self { store, max_age: route.rule.max_age(), max_entries: route.rule.max_entries }
    }

    /// Persist an ok response, then apply the FIFO bound.
    ///
    /// A failed write is logged and swallowed: the caller already holds a
    /// live response worth returning.
    pub(crate) async fn write_through(&self, clock: &dyn Clock, url: &Url, response: &Response) {
        if !response.is_ok() {
            return;
        }

        let options = WriteOptions { written_at: self.max_age.map(|_| clock.now()), max_entries: self.max_entries };
        match self.store.put(url, response, options).await {
            Ok(evicted) => {
                tracing::debug!(store = self.store.name(), url = %url, evicted, "stored response");
            }
            Err(err) => {
                tracing::warn!(store = self.store.name(), url = %url, error = %err, "failed to store response");
            }
        }
    }
}

/// A route's executor, bound to its store.
#[derive(Debug, Clone)]
pub enum Strategy {
    CacheFirst(CacheFirst),
    NetworkFirst(NetworkFirst),
    StaleWhileRevalidate(StaleWhileRevalidate),
    NetworkOnly(NetworkOnly),
    CacheOnly(CacheOnly),
}

impl Strategy {
    pub fn for_route(route: &CompiledRoute, store: CacheStore) -> Self {
        let persist = Persist::for_route(route, store);
        match route.rule.strategy {
            StrategyKind::CacheFirst => Strategy::CacheFirst(CacheFirst::new(persist)),
            StrategyKind::NetworkFirst => {
                Strategy::NetworkFirst(NetworkFirst::new(persist, route.rule.network_timeout()))
            }
            StrategyKind::StaleWhileRevalidate => Strategy::StaleWhileRevalidate(StaleWhileRevalidate::new(persist)),
            StrategyKind::NetworkOnly => Strategy::NetworkOnly(NetworkOnly),
            StrategyKind::CacheOnly => Strategy::CacheOnly(CacheOnly::new(persist.store)),
        }
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::CacheFirst(_) => StrategyKind::CacheFirst,
            Strategy::NetworkFirst(_) => StrategyKind::NetworkFirst,
            Strategy::StaleWhileRevalidate(_) => StrategyKind::StaleWhileRevalidate,
            Strategy::NetworkOnly(_) => StrategyKind::NetworkOnly,
            Strategy::CacheOnly(_) => StrategyKind::CacheOnly,
        }
    }

    pub async fn handle(&self, ctx: &Context, request: &Request) -> Result<Served, Error> {
        match self {
            Strategy::CacheFirst(s) => s.handle(ctx, request).await,
            Strategy::NetworkFirst(s) => s.handle(ctx, request).await,
            Strategy::StaleWhileRevalidate(s) => s.handle(ctx, request).await,
            Strategy::NetworkOnly(s) => s.handle(ctx, request).await,
            Strategy::CacheOnly(s) => s.handle(request).await,
        }
    }
}
