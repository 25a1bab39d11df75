//! cache_purge tool implementation.
//!
//! Deletes cached responses for a URL, a whole store, or every store that is
//! not a current generation.

use super::store_for;
use crate::tools::json_result;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_client::ServiceWorker;
use swcache_core::{Error, InterceptedRequest, StoreRole};

/// Parameters for the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeParams {
    /// Drop every cached variant of this URL (query ignored) from `role`'s store.
    pub url: Option<String>,

    /// Store the `url` purge applies to (default: api).
    #[serde(default)]
    pub role: Option<StoreRole>,

    /// Delete this store outright.
    pub store: Option<String>,

    /// Delete every store that is not a current generation.
    #[serde(default)]
    pub stale: bool,
}

/// Output from the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeOutput {
    /// Number of entries deleted by a URL purge.
    pub deleted_entries: u64,
    /// Stores deleted.
    pub deleted_stores: Vec<String>,
}

pub async fn purge_impl(worker: &ServiceWorker, params: CachePurgeParams) -> Result<CallToolResult, McpError> {
    if params.url.is_none() && params.store.is_none() && !params.stale {
        return Err(Error::InvalidInput("At least one of url, store, or stale must be specified".to_string()).into());
    }

    let db = worker.db();
    let mut output = CachePurgeOutput { deleted_entries: 0, deleted_stores: Vec::new() };

    if let Some(url) = params.url {
        let request = InterceptedRequest::parse("GET", &url)?;
        let (store, _) = store_for(worker, params.role.unwrap_or(StoreRole::Api));
        output.deleted_entries += db.delete_url_variants(&store, &request.url).await?;
    }

    if let Some(store) = params.store
        && db.delete_store(&store).await?
    {
        output.deleted_stores.push(store);
    }

    if params.stale {
        let current = worker.lifecycle().current_stores();
        for name in db.store_names().await? {
            if !current.contains(&name.as_str()) && db.delete_store(&name).await? {
                output.deleted_stores.push(name);
            }
        }
    }

    tracing::info!(
        entries = output.deleted_entries,
        stores = output.deleted_stores.len(),
        "cache purged"
    );
    json_result(&output)
}
