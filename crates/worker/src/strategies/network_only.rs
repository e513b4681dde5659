use pwakit_core::{Error, Request};

use super::{Context, Served};

/// Always the network; never touches a store.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetworkOnly;

impl NetworkOnly {
    pub async fn handle(&self, ctx: &Context, request: &Request) -> Result<Served, Error> {
        ctx.network.fetch(request).await.map(Served::network)
    }
}
