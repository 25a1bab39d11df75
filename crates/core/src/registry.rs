//! Shell asset registry.
//!
//! The application shell is the fixed set of files the page needs to boot
//! offline: markup, the script bundle, the manifest, icons and the vendored
//! map library. Membership in this list is the only input to the classifier's
//! shell-asset rule.

use crate::Error;
use url::Url;

/// Shell assets shipped with the default deployment.
pub const DEFAULT_SHELL_ASSETS: &[&str] = &[
    "/",
    "/index.html",
    "/bundle.js",
    "/manifest.json",
    "/icons/icon-96x96.png",
    "/icons/icon-144x144.png",
    "/icons/icon-152x152.png",
    "/icons/icon-512x512.png",
    "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css",
    "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js",
];

/// One registry entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellAsset {
    /// Root-relative path served by the page's own origin.
    SameOrigin(String),
    /// Absolute URL on a third-party origin, matched exactly.
    CrossOrigin(Url),
}

/// Static list of shell assets for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct ShellAssetRegistry {
    site_origin: Url,
    assets: Vec<ShellAsset>,
}

impl ShellAssetRegistry {
    /// Build a registry for the page served from `site_origin`.
    ///
    /// Entries starting with `/` are same-origin paths; anything else must be
    /// an absolute http(s) URL.
    pub fn new<S: AsRef<str>>(site_origin: &str, entries: &[S]) -> Result<Self, Error> {
        let site_origin = Url::parse(site_origin).map_err(|e| Error::InvalidUrl(format!("{site_origin}: {e}")))?;

        let mut assets = Vec::with_capacity(entries.len());
        for entry in entries {
            let entry = entry.as_ref().trim();
            if entry.starts_with('/') {
                let path = entry.split(['?', '#']).next().unwrap_or(entry);
                assets.push(ShellAsset::SameOrigin(path.to_string()));
                continue;
            }

            let mut url = Url::parse(entry).map_err(|e| Error::InvalidUrl(format!("{entry}: {e}")))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(Error::InvalidUrl(format!("unsupported scheme for shell asset: {entry}")));
            }
            url.set_fragment(None);
            assets.push(ShellAsset::CrossOrigin(url));
        }

        Ok(Self { site_origin, assets })
    }

    pub fn entries(&self) -> &[ShellAsset] {
        &self.assets
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Absolute URL for an entry.
    pub fn resolve(&self, asset: &ShellAsset) -> Url {
        match asset {
            ShellAsset::SameOrigin(path) => {
                let mut url = self.site_origin.clone();
                url.set_path(path);
                url.set_query(None);
                url
            }
            ShellAsset::CrossOrigin(url) => url.clone(),
        }
    }

    /// Absolute URLs of every entry, in registry order.
    pub fn urls(&self) -> Vec<Url> {
        self.assets.iter().map(|a| self.resolve(a)).collect()
    }

    /// Whether `url` names a shell asset.
    ///
    /// Same-origin entries compare on path with the query string ignored;
    /// cross-origin entries must match exactly.
    pub fn contains(&self, url: &Url) -> bool {
        let same_origin = url.origin() == self.site_origin.origin();
        let mut bare = url.clone();
        bare.set_fragment(None);

        self.assets.iter().any(|asset| match asset {
            ShellAsset::SameOrigin(path) => same_origin && url.path() == path,
            ShellAsset::CrossOrigin(entry) => *entry == bare,
        })
    }
}
