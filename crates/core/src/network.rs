//! The network seam used by strategies and the precache installer.

use async_trait::async_trait;

use crate::{Error, Request, Response};

/// Something that can carry a request to the network.
///
/// A non-ok HTTP status is still `Ok`: only transport failures
/// (DNS, connect, reset, body read) are errors.
#[async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: &Request) -> Result<Response, Error>;
}
