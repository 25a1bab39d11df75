//! Request identity and cache key generation.

use sha2::{Digest, Sha256};
use url::Url;

/// URL with query string and fragment removed.
pub fn url_base(url: &Url) -> String {
    let mut base = url.clone();
    base.set_query(None);
    base.set_fragment(None);
    base.to_string()
}

/// URL with only the fragment removed.
pub fn url_exact(url: &Url) -> String {
    let mut exact = url.clone();
    exact.set_fragment(None);
    exact.to_string()
}

/// Compute the key an entry is stored under.
///
/// `identity_url` is already normalized by the caller: [`url_base`] for
/// shell assets, [`url_exact`] for API responses.
pub fn compute_entry_key(method: &str, identity_url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.to_ascii_uppercase().as_bytes());
    hasher.update(b"\n");
    hasher.update(identity_url.as_bytes());
    hex::encode(hasher.finalize())
}
