//! Cache-related MCP tools.
//!
//! This module provides tools for inspecting and pruning the cache stores.

pub mod get;
pub mod purge;

pub use get::{CacheGetParams, get_impl};
pub use purge::{CachePurgeParams, purge_impl};

use swcache_client::ServiceWorker;
use swcache_core::{MatchMode, StoreRole};

/// Current store name and lookup mode for a role.
pub(crate) fn store_for(worker: &ServiceWorker, role: StoreRole) -> (String, MatchMode) {
    let config = worker.strategies().config();
    match role {
        StoreRole::Shell => (config.shell_store.clone(), MatchMode::IgnoreQuery),
        StoreRole::Api => (config.api_store.clone(), MatchMode::Exact),
    }
}
