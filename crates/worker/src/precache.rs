//! Precache installer.
//!
//! Fetches every manifest URL concurrently and only writes once all of them
//! have succeeded, in one store transaction. A single failed or non-ok fetch
//! fails the install and leaves the store untouched.

use futures_util::future::try_join_all;
use pwakit_core::program::PrecacheManifest;
use pwakit_core::{CacheStore, Error, Network, Request};
use url::Url;

/// Fill `store` with every URL in `manifest`, all or nothing.
///
/// Returns the number of URLs stored.
pub async fn install(
    network: &dyn Network, origin: &Url, manifest: &PrecacheManifest, store: &CacheStore,
) -> Result<usize, Error> {
    let requests = manifest
        .urls
        .iter()
        .map(|entry| {
            pwakit_client::resolve(origin, entry)
                .map(|url| Request::new(http::Method::GET, url))
                .map_err(|e| Error::InstallFailed(format!("{entry}: {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let fetched = try_join_all(requests.into_iter().map(|request| async move {
        match network.fetch(&request).await {
            Ok(response) if response.is_ok() => Ok((request.url, response)),
            Ok(response) => Err(Error::InstallFailed(format!("{}: status {}", request.url, response.status))),
            Err(err) => Err(Error::InstallFailed(format!("{}: {err}", request.url))),
        }
    }))
    .await?;

    store.put_all(&fetched).await.map_err(|e| Error::InstallFailed(format!("store write failed: {e}")))?;

    tracing::info!(store = store.name(), urls = fetched.len(), "precache installed");
    Ok(fetched.len())
}
