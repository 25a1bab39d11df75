//! push tool implementation.

use super::json_result;
use crate::error::ToolError;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_client::{ServiceWorker, WorkerEvent, WorkerOutcome};

/// Input parameters for the push tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PushParams {
    /// Raw push payload, normally `{"title": ..., "options": {...}}`.
    /// Omit it to simulate a push without data.
    #[serde(default)]
    pub payload: Option<String>,
}

pub async fn push_impl(worker: &ServiceWorker, params: PushParams) -> Result<CallToolResult, McpError> {
    let data = params.payload.map(String::into_bytes);
    match worker.dispatch(WorkerEvent::Push(data)).await? {
        WorkerOutcome::Notified(notification) => json_result(&notification),
        other => Err(ToolError::InvalidInput(format!("unexpected outcome {other:?}")).into()),
    }
}
