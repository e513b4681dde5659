use pwakit_core::{Error, Request, Response};

use super::{Context, Persist, Served};

/// Serve from the store while fresh; otherwise fetch and store.
#[derive(Debug, Clone)]
pub struct CacheFirst {
    persist: Persist,
}

impl CacheFirst {
    pub(crate) fn new(persist: Persist) -> Self {
        Self { persist }
    }

    pub async fn handle(&self, ctx: &Context, request: &Request) -> Result<Served, Error> {
        let cached = self.persist.store.lookup(&request.url).await?;

        if let Some(entry) = &cached {
            let now = ctx.clock.now();
            if self.persist.max_age.is_none_or(|max_age| !entry.is_expired(max_age, now)) {
                tracing::debug!(store = self.persist.store.name(), url = %request.url, "cache hit");
                return Ok(Served::cache(entry.response.clone()));
            }
            tracing::debug!(store = self.persist.store.name(), url = %request.url, "cache entry expired");
        }

        match ctx.network.fetch(request).await {
            Ok(response) => {
                self.persist.write_through(ctx.clock.as_ref(), &request.url, &response).await;
                Ok(Served::network(response))
            }
            Err(err) if err.is_network() => {
                tracing::debug!(url = %request.url, error = %err, "network failed, serving fallback");
                Ok(match cached {
                    Some(entry) => Served::cache(entry.response),
                    None => Served::synthesized(Response::network_error()),
                })
            }
            Err(err) => Err(err),
        }
    }
}
