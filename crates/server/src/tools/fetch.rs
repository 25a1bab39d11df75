//! fetch tool implementation.
//!
//! Sends one request through the controller as if a page had issued it.

use super::json_result;
use crate::error::ToolError;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use swcache_client::{RoutedResponse, ServiceWorker};
use swcache_core::{InterceptedRequest, RoutingClass};

/// Input parameters for the fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FetchParams {
    /// Absolute URL of the request.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default = "default_method")]
    pub method: String,

    /// Request headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Request body as UTF-8 text.
    #[serde(default)]
    pub body: Option<String>,
}

fn default_method() -> String {
    "GET".into()
}

/// Output structure for the fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FetchOutput {
    /// Routing class the request falls into.
    pub class: RoutingClass,
    /// Whether the controller applied a strategy instead of passing through.
    pub intercepted: bool,
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    /// Body decoded as UTF-8, lossy.
    pub body: String,
}

pub async fn fetch_impl(worker: &ServiceWorker, params: FetchParams) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(ToolError::InvalidInput("url cannot be empty".into()).into());
    }

    let mut request = InterceptedRequest::parse(&params.method, &params.url)?;
    for (name, value) in params.headers {
        request = request.with_header(name, value);
    }
    if let Some(body) = params.body {
        request = request.with_body(body);
    }

    let RoutedResponse { class, intercepted, response } = worker.route_fetch(&request).await?;

    let body = response.text();
    json_result(&FetchOutput {
        class,
        intercepted,
        status: response.status,
        status_text: response.status_text,
        headers: response.headers,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{parse, worker};
    use crate::tools::lifecycle::install_impl;

    fn params(method: &str, url: &str) -> FetchParams {
        FetchParams { url: url.into(), method: method.into(), headers: BTreeMap::new(), body: None }
    }

    #[tokio::test]
    async fn test_fetch_empty_url() {
        let (worker, _host) = worker(true).await;
        assert!(fetch_impl(&worker, params("GET", " ")).await.is_err());
    }

    #[tokio::test]
    async fn test_fetch_before_install_is_passthrough() {
        let (worker, _host) = worker(true).await;
        let output: FetchOutput =
            parse(&fetch_impl(&worker, params("GET", "http://localhost:3000/index.html")).await.unwrap());
        assert_eq!(output.class, RoutingClass::ShellAsset);
        assert!(!output.intercepted);
        assert_eq!(output.body, "/index.html");
    }

    #[tokio::test]
    async fn test_fetch_offline_listing() {
        let (worker, _host) = worker(false).await;
        install_impl(&worker).await.unwrap();

        let output: FetchOutput =
            parse(&fetch_impl(&worker, params("get", "https://story-api.dicoding.dev/v1/stories")).await.unwrap());
        assert_eq!(output.class, RoutingClass::ApiRead);
        assert!(output.intercepted);
        assert_eq!(output.status, 200);
        assert!(output.headers.iter().any(|(k, v)| k == "X-Offline" && v == "true"));
    }

    #[tokio::test]
    async fn test_fetch_while_suspended_reports_bypass() {
        let (worker, _host) = worker(true).await;
        install_impl(&worker).await.unwrap();

        let _guard = worker.gate().suspend();
        let output: FetchOutput =
            parse(&fetch_impl(&worker, params("GET", "https://story-api.dicoding.dev/v1/stories")).await.unwrap());
        assert_eq!(output.class, RoutingClass::ApiRead);
        assert!(!output.intercepted);
    }

    #[tokio::test]
    async fn test_fetch_passthrough_error() {
        let (worker, _host) = worker(false).await;
        install_impl(&worker).await.unwrap();
        let result = fetch_impl(&worker, params("GET", "https://tile.openstreetmap.org/1/0/0.png")).await;
        assert!(result.is_err());
    }
}
