use pwakit_core::{Error, Request, Response};
use tokio::sync::oneshot;

use super::{Context, Persist, Served};

/// Serve the stored entry at once and refresh it in the background.
#[derive(Debug, Clone)]
pub struct StaleWhileRevalidate {
    persist: Persist,
}

impl StaleWhileRevalidate {
    pub(crate) fn new(persist: Persist) -> Self {
        Self { persist }
    }

    pub async fn handle(&self, ctx: &Context, request: &Request) -> Result<Served, Error> {
        let cached = self.persist.store.lookup(&request.url).await?;

        let (tx, rx) = oneshot::channel();
        let network = ctx.network.clone();
        let clock = ctx.clock.clone();
        let persist = self.persist.clone();
        let req = request.clone();

        ctx.background.spawn(async move {
            let result = network.fetch(&req).await;
            let fetched = match &result {
                Ok(response) => Some(response.clone()),
                Err(err) => {
                    tracing::debug!(url = %req.url, error = %err, "background refresh failed");
                    None
                }
            };
            // A waiting miss gets the response before the store write lands.
            let _ = tx.send(result);
            if let Some(response) = fetched {
                persist.write_through(clock.as_ref(), &req.url, &response).await;
            }
        });

        if let Some(entry) = cached {
            tracing::debug!(store = self.persist.store.name(), url = %request.url, "serving cached, revalidating");
            return Ok(Served::cache(entry.response));
        }

        match rx.await {
            Ok(Ok(response)) => Ok(Served::network(response)),
            Ok(Err(err)) if !err.is_network() => Err(err),
            _ => Ok(Served::synthesized(Response::network_error())),
        }
    }
}
