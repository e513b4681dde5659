use std::time::Duration;

use pwakit_core::{Error, Request, Response};
use tokio::sync::oneshot;

use super::{Context, Persist, Served};

/// Race the network against a timer; fall back to the store.
///
/// The fetch runs as a background task, so a fetch that loses the race
/// still completes and writes through to the store.
#[derive(Debug, Clone)]
pub struct NetworkFirst {
    persist: Persist,
    timeout: Duration,
}

impl NetworkFirst {
    pub(crate) fn new(persist: Persist, timeout: Duration) -> Self {
        Self { persist, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn handle(&self, ctx: &Context, request: &Request) -> Result<Served, Error> {
        let (tx, rx) = oneshot::channel();
        let network = ctx.network.clone();
        let clock = ctx.clock.clone();
        let persist = self.persist.clone();
        let req = request.clone();

        // The race settles when the fetch does; the store write follows it.
        ctx.background.spawn(async move {
            let result = network.fetch(&req).await;
            let fetched = result.as_ref().ok().cloned();
            let _ = tx.send(result);
            if let Some(response) = fetched {
                persist.write_through(clock.as_ref(), &req.url, &response).await;
            }
        });

        match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(Ok(response))) => return Ok(Served::network(response)),
            Ok(Ok(Err(err))) if !err.is_network() => return Err(err),
            Ok(Ok(Err(err))) => {
                tracing::debug!(url = %request.url, error = %err, "network failed, falling back to store");
            }
            Ok(Err(_)) => {
                tracing::warn!(url = %request.url, "network task dropped, falling back to store");
            }
            Err(_) => {
                tracing::debug!(
                    url = %request.url,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "network timed out, falling back to store"
                );
            }
        }

        Ok(match self.persist.store.lookup(&request.url).await? {
            Some(entry) => Served::cache(entry.response),
            None => Served::synthesized(Response::network_error()),
        })
    }
}
