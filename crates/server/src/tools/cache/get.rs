//! cache_get tool implementation.
//!
//! Looks up a stored response in the current shell or API store.

use super::store_for;
use crate::tools::json_result;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_client::ServiceWorker;
use swcache_core::{Error, InterceptedRequest, StoreRole, StoredEntry};

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// Which store to look in: "shell" or "api".
    pub role: StoreRole,

    /// Absolute URL of the request.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default = "default_method")]
    pub method: String,
}

fn default_method() -> String {
    "GET".into()
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    pub entry: StoredEntry,
}

pub async fn get_impl(worker: &ServiceWorker, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    let request = InterceptedRequest::parse(&params.method, &params.url)?;
    let (store, mode) = store_for(worker, params.role);

    let entry = worker
        .db()
        .get_entry(&store, &request.method, &request.url, mode)
        .await?
        .ok_or_else(|| Error::CacheMiss(format!("{} {} in {store}", request.method, request.url)))?;

    json_result(&CacheGetOutput { entry })
}
