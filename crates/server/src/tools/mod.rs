//! MCP tool implementations.
//!
//! Each tool drives the cache controller the way a browser host would:
//! lifecycle events, intercepted fetches, page messages and pushes.

pub mod cache;
pub mod fetch;
pub mod lifecycle;
pub mod push;

use crate::error::ToolError;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

/// Pretty-printed JSON tool result.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output).map_err(ToolError::from)?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
