//! Request identity for store keys.

use sha2::{Digest, Sha256};
use url::Url;

/// Compute the store key for a request URL.
///
/// The fragment never reaches the network, so it is not part of the identity.
/// The query string is.
pub fn request_key(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);

    let mut hasher = Sha256::new();
    hasher.update(b"GET\n");
    hasher.update(url.as_str().as_bytes());
    hex::encode(hasher.finalize())
}
