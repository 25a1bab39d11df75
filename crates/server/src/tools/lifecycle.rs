//! install, activate, skip_waiting and status tools.

use super::json_result;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use serde::{Deserialize, Serialize};
use serde_json::json;
use swcache_client::{
    ActivationReport, Host, LifecycleState, LocalHost, ServiceWorker, WorkerEvent, WorkerOutcome,
};
use swcache_core::{Error, StoreInfo};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkipWaitingOutput {
    /// Whether the command activated this version right away.
    pub activated: bool,
    pub report: Option<ActivationReport>,
    pub state: LifecycleState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusOutput {
    pub state: LifecycleState,
    pub suspended: bool,
    pub current_stores: Vec<String>,
    pub stores: Vec<StoreInfo>,
    pub open_pages: usize,
    pub notifications: usize,
}

fn unexpected(outcome: &WorkerOutcome) -> McpError {
    Error::InvalidInput(format!("unexpected outcome {outcome:?}")).into()
}

pub async fn install_impl(worker: &ServiceWorker) -> Result<CallToolResult, McpError> {
    match worker.dispatch(WorkerEvent::Install).await? {
        WorkerOutcome::Installed(report) => json_result(&report),
        other => Err(unexpected(&other)),
    }
}

pub async fn activate_impl(worker: &ServiceWorker) -> Result<CallToolResult, McpError> {
    match worker.dispatch(WorkerEvent::Activate).await? {
        WorkerOutcome::Activated(report) => json_result(&report),
        other => Err(unexpected(&other)),
    }
}

pub async fn skip_waiting_impl(worker: &ServiceWorker) -> Result<CallToolResult, McpError> {
    let message = json!({"type": "skip-waiting"});
    match worker.dispatch(WorkerEvent::Message(message)).await? {
        WorkerOutcome::Promoted(report) => json_result(&SkipWaitingOutput {
            activated: report.is_some(),
            report,
            state: worker.state(),
        }),
        other => Err(unexpected(&other)),
    }
}

pub async fn status_impl(worker: &ServiceWorker, host: &LocalHost) -> Result<CallToolResult, McpError> {
    let output = StatusOutput {
        state: worker.state(),
        suspended: worker.gate().is_suspended(),
        current_stores: worker
            .lifecycle()
            .current_stores()
            .iter()
            .map(|s| s.to_string())
            .collect(),
        stores: worker.db().list_stores().await?,
        open_pages: host.pages().await.len(),
        notifications: host.notifications().len(),
    };
    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{parse, worker};
    use swcache_client::InstallReport;

    #[tokio::test]
    async fn test_install_then_status() {
        let (worker, host) = worker(true).await;

        let report: InstallReport = parse(&install_impl(&worker).await.unwrap());
        assert_eq!(report.cached.len(), 2);
        assert_eq!(report.state, LifecycleState::Active);

        let status: StatusOutput = parse(&status_impl(&worker, &host).await.unwrap());
        assert_eq!(status.state, LifecycleState::Active);
        assert!(!status.suspended);
        assert_eq!(status.current_stores, vec!["story-spa-shell-v3", "story-spa-api-v2"]);
        assert_eq!(status.stores.len(), 1);
        assert_eq!(status.stores[0].entries, 2);
    }

    #[tokio::test]
    async fn test_install_twice_fails() {
        let (worker, _host) = worker(true).await;
        install_impl(&worker).await.unwrap();
        assert!(install_impl(&worker).await.is_err());
    }

    #[tokio::test]
    async fn test_skip_waiting_activates_waiting_worker() {
        let (worker, host) = worker(true).await;
        let (_page, mut rx) = host.open_page();
        install_impl(&worker).await.unwrap();
        assert_eq!(worker.state(), LifecycleState::Waiting);

        let output: SkipWaitingOutput = parse(&skip_waiting_impl(&worker).await.unwrap());
        assert!(output.activated);
        assert_eq!(output.state, LifecycleState::Active);
        assert!(rx.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_activate_requires_waiting() {
        let (worker, _host) = worker(true).await;
        assert!(activate_impl(&worker).await.is_err());
    }
}
