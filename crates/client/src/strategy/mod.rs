//! Caching strategies, one per routing class.
//!
//! | Class | On success | On network failure |
//! |---|---|---|
//! | API write | drop matching API entries | synthesized 503 JSON |
//! | API read | upsert API entry | cached entry, else 200 empty listing or 503 |
//! | shell asset | upsert shell entry (foreground or background) | synthesized 503 |
//! | passthrough | nothing | error propagated |
//!
//! Storage failures never reach the caller: they are logged and the strategy
//! carries on to its documented response.

pub mod background;
pub mod fallback;

use crate::fetch::{FetchMode, Network, NetworkError};
use background::BackgroundTasks;
use std::sync::Arc;
use swcache_core::{AppConfig, CacheDb, Error, InterceptedRequest, MatchMode, ResponseSnapshot, RoutingClass};
use url::Url;

/// Store names and API layout the strategies operate on.
#[derive(Debug, Clone)]
pub struct StrategyConfig {
    pub shell_store: String,
    pub api_store: String,
    pub api_origin: Url,
    /// Collection-listing paths, without trailing slash.
    pub collection_paths: Vec<String>,
    pub offline_header: String,
}

impl StrategyConfig {
    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let api_origin =
            Url::parse(&config.api_origin).map_err(|e| Error::InvalidUrl(format!("{}: {e}", config.api_origin)))?;
        Ok(Self {
            shell_store: config.shell_generation().store_name(),
            api_store: config.api_generation().store_name(),
            api_origin,
            collection_paths: config
                .collection_paths
                .iter()
                .map(|p| p.trim_end_matches('/').to_string())
                .collect(),
            offline_header: config.offline_header.clone(),
        })
    }

    fn on_api_origin(&self, url: &Url) -> bool {
        url.origin() == self.api_origin.origin()
    }

    /// Whether `url` is a collection-listing endpoint (any query string).
    pub fn is_collection(&self, url: &Url) -> bool {
        let path = url.path().trim_end_matches('/');
        self.on_api_origin(url) && self.collection_paths.iter().any(|c| c == path)
    }

    /// Whether `url` is an item directly or indirectly under a collection.
    pub fn is_collection_item(&self, url: &Url) -> bool {
        let path = url.path();
        self.on_api_origin(url)
            && self.collection_paths.iter().any(|c| {
                path.strip_prefix(c.as_str())
                    .and_then(|rest| rest.strip_prefix('/'))
                    .is_some_and(|rest| !rest.is_empty())
            })
    }

    /// Every listing URL, with and without the trailing slash
    /// [`is_collection`](Self::is_collection) tolerates.
    fn collection_urls(&self) -> impl Iterator<Item = Url> + '_ {
        self.collection_paths.iter().flat_map(|path| {
            [path.clone(), format!("{path}/")].map(|p| {
                let mut url = self.api_origin.clone();
                url.set_path(&p);
                url
            })
        })
    }
}

/// Executes strategies against the cache stores and the network.
#[derive(Clone)]
pub struct StrategyEngine {
    db: CacheDb,
    network: Arc<dyn Network>,
    config: Arc<StrategyConfig>,
    background: BackgroundTasks,
}

impl StrategyEngine {
    pub fn new(db: CacheDb, network: Arc<dyn Network>, config: StrategyConfig) -> Self {
        Self { db, network, config: Arc::new(config), background: BackgroundTasks::new() }
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    /// Run the strategy for `class`.
    ///
    /// Only passthrough can fail; every other class always yields a response.
    pub async fn execute(
        &self, class: RoutingClass, request: &InterceptedRequest,
    ) -> Result<ResponseSnapshot, NetworkError> {
        match class {
            RoutingClass::ApiWrite => Ok(self.write_through(request).await),
            RoutingClass::ApiRead => Ok(self.network_first(request).await),
            RoutingClass::ShellAsset => Ok(self.cache_first(request).await),
            RoutingClass::Passthrough => self.passthrough(request).await,
        }
    }

    /// Forward unmodified. Nothing is cached; failures propagate.
    pub async fn passthrough(&self, request: &InterceptedRequest) -> Result<ResponseSnapshot, NetworkError> {
        self.network.fetch(request, FetchMode::Default).await
    }

    /// Cache first with background refresh, for shell assets.
    ///
    /// Only GET is stored or served from the store. Other methods on a shell
    /// path go to the network and keep the offline fallback.
    pub async fn cache_first(&self, request: &InterceptedRequest) -> ResponseSnapshot {
        let store = &self.config.shell_store;

        if request.method != "GET" {
            return self.network.fetch(request, FetchMode::Default).await.unwrap_or_else(|e| {
                tracing::warn!("{} {} unavailable: {e}", request.method, request.url);
                fallback::shell_unavailable(&request.url)
            });
        }

        let cached = self
            .db
            .match_entry(store, &request.method, &request.url, MatchMode::IgnoreQuery)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("shell lookup failed for {}: {e}", request.url);
                None
            });

        if let Some(cached) = cached {
            tracing::debug!("serving {} from {store}", request.url);
            self.spawn_refresh(request.clone());
            return cached;
        }

        match self.network.fetch(request, FetchMode::Default).await {
            Ok(response) => {
                if response.ok() {
                    self.store(store, request, MatchMode::IgnoreQuery, &response).await;
                }
                response
            }
            Err(e) => {
                tracing::warn!("shell asset {} unavailable: {e}", request.url);
                fallback::shell_unavailable(&request.url)
            }
        }
    }

    /// Refresh a shell entry off the request path.
    ///
    /// The result is never observed by any caller and every failure is
    /// discarded.
    fn spawn_refresh(&self, request: InterceptedRequest) {
        let db = self.db.clone();
        let network = self.network.clone();
        let store = self.config.shell_store.clone();

        self.background.spawn_detached(async move {
            match network.fetch(&request, FetchMode::Default).await {
                Ok(response) if response.ok() => {
                    match db
                        .put_entry(&store, &request.method, &request.url, MatchMode::IgnoreQuery, &response)
                        .await
                    {
                        Ok(()) => tracing::debug!("background refreshed {}", request.url),
                        Err(e) => tracing::debug!("background refresh of {} not stored: {e}", request.url),
                    }
                }
                Ok(response) => tracing::debug!("background refresh of {} got {}", request.url, response.status),
                Err(e) => tracing::debug!("background refresh of {} failed: {e}", request.url),
            }
        });
    }

    /// Network first with offline fallback, for API reads.
    pub async fn network_first(&self, request: &InterceptedRequest) -> ResponseSnapshot {
        let store = &self.config.api_store;

        match self.network.fetch(request, FetchMode::Default).await {
            Ok(response) => {
                if response.ok() {
                    self.store(store, request, MatchMode::Exact, &response).await;
                }
                return response;
            }
            Err(e) => tracing::info!("network failed for {}, checking cache: {e}", request.url),
        }

        match self.db.match_entry(store, &request.method, &request.url, MatchMode::Exact).await {
            Ok(Some(cached)) => {
                tracing::debug!("serving cached API response for {}", request.url);
                return cached;
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("API cache lookup failed for {}: {e}", request.url),
        }

        if self.config.is_collection(&request.url) {
            fallback::offline_listing(&self.config.offline_header)
        } else {
            fallback::read_unavailable()
        }
    }

    /// Write through with invalidation, for API writes.
    ///
    /// Invalidation finishes before the response is returned, so a read
    /// issued after the write completes cannot see the stale listing.
    pub async fn write_through(&self, request: &InterceptedRequest) -> ResponseSnapshot {
        match self.network.fetch(request, FetchMode::Default).await {
            Ok(response) => {
                if response.ok() {
                    self.invalidate(&request.url).await;
                }
                response
            }
            Err(e) => {
                tracing::info!("write to {} failed, offline: {e}", request.url);
                fallback::write_unavailable()
            }
        }
    }

    async fn invalidate(&self, url: &Url) {
        let store = &self.config.api_store;
        let mut deleted = 0u64;

        for collection in self.config.collection_urls() {
            match self.db.delete_url_variants(store, &collection).await {
                Ok(n) => deleted += n,
                Err(e) => tracing::warn!("failed to invalidate {collection}: {e}"),
            }
        }

        if self.config.is_collection_item(url) {
            match self.db.delete_entry(store, "GET", url, MatchMode::Exact).await {
                Ok(true) => deleted += 1,
                Ok(false) => {}
                Err(e) => tracing::warn!("failed to invalidate {url}: {e}"),
            }
        }

        tracing::debug!(deleted, "cache invalidated after write to {url}");
    }

    async fn store(&self, store: &str, request: &InterceptedRequest, mode: MatchMode, response: &ResponseSnapshot) {
        let result = async {
            self.db.open_store(store).await?;
            self.db
                .put_entry(store, &request.method, &request.url, mode, response)
                .await
        }
        .await;

        match result {
            Ok(()) => tracing::debug!("cached {} in {store}", request.url),
            Err(e) => tracing::warn!("failed to cache {} in {store}: {e}", request.url),
        }
    }

    /// Wait for outstanding background refreshes.
    pub async fn drain_background(&self) {
        self.background.drain().await;
    }
}
