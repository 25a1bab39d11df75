//! Single entry point for host events.
//!
//! Every phase the host drives (install, activate, fetch, message, push)
//! arrives as a [`WorkerEvent`]. The future returned by
//! [`ServiceWorker::dispatch`] is the completion token: the host treats the
//! phase as done only once it resolves.

use crate::fetch::Network;
use crate::host::Host;
use crate::lifecycle::{
    ActivationReport, ControlMessage, InstallReport, LifecycleController, LifecycleState, Registration, SuspensionGate,
};
use crate::push::Notification;
use crate::strategy::{StrategyConfig, StrategyEngine};
use serde_json::Value;
use std::sync::Arc;
use swcache_core::{AppConfig, CacheDb, Error, InterceptedRequest, RequestClassifier, ResponseSnapshot, RoutingClass};

/// Typed transition input.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    Install,
    Activate,
    Fetch(InterceptedRequest),
    Message(Value),
    Push(Option<Vec<u8>>),
}

/// Result of a dispatched event.
#[derive(Debug, Clone)]
pub enum WorkerOutcome {
    Installed(InstallReport),
    Activated(ActivationReport),
    Response(ResponseSnapshot),
    /// Outcome of a promotion command; `None` when it did not activate now.
    Promoted(Option<ActivationReport>),
    Notified(Notification),
}

/// A response together with the routing decision that produced it.
#[derive(Debug, Clone)]
pub struct RoutedResponse {
    pub class: RoutingClass,
    /// False when the request bypassed every strategy.
    pub intercepted: bool,
    pub response: ResponseSnapshot,
}

pub struct ServiceWorker {
    db: CacheDb,
    classifier: RequestClassifier,
    strategies: StrategyEngine,
    lifecycle: Arc<LifecycleController>,
    host: Arc<dyn Host>,
    gate: SuspensionGate,
}

impl ServiceWorker {
    pub fn new(config: &AppConfig, db: CacheDb, network: Arc<dyn Network>, host: Arc<dyn Host>) -> Result<Self, Error> {
        let gate = SuspensionGate::new();
        let classifier = config.classifier()?;
        let strategies = StrategyEngine::new(db.clone(), network.clone(), StrategyConfig::from_config(config)?);
        let lifecycle = Arc::new(LifecycleController::new(
            config,
            db.clone(),
            network,
            host.clone(),
            gate.clone(),
        )?);

        Ok(Self { db, classifier, strategies, lifecycle, host, gate })
    }

    pub async fn dispatch(&self, event: WorkerEvent) -> Result<WorkerOutcome, Error> {
        match event {
            WorkerEvent::Install => self.lifecycle.install().await.map(WorkerOutcome::Installed),
            WorkerEvent::Activate => self.lifecycle.activate().await.map(WorkerOutcome::Activated),
            WorkerEvent::Fetch(request) => self.handle_fetch(&request).await.map(WorkerOutcome::Response),
            WorkerEvent::Message(value) => self.handle_message(&value).await.map(WorkerOutcome::Promoted),
            WorkerEvent::Push(data) => self.handle_push(data.as_deref()).await.map(WorkerOutcome::Notified),
        }
    }

    /// Answer an intercepted request.
    pub async fn handle_fetch(&self, request: &InterceptedRequest) -> Result<ResponseSnapshot, Error> {
        Ok(self.route_fetch(request).await?.response)
    }

    /// Answer an intercepted request and report how it was routed.
    ///
    /// While suspended, or before this version is active, the request goes
    /// straight to the network.
    pub async fn route_fetch(&self, request: &InterceptedRequest) -> Result<RoutedResponse, Error> {
        let class = self.classifier.classify_request(request);

        if self.gate.is_suspended() || self.lifecycle.state() != LifecycleState::Active {
            tracing::debug!("not intercepting {} {}", request.method, request.url);
            let response = self.strategies.passthrough(request).await?;
            return Ok(RoutedResponse { class, intercepted: false, response });
        }

        tracing::debug!(?class, "{} {}", request.method, request.url);
        let response = self.strategies.execute(class, request).await?;
        Ok(RoutedResponse { class, intercepted: true, response })
    }

    pub async fn handle_message(&self, value: &Value) -> Result<Option<ActivationReport>, Error> {
        let message = ControlMessage::from_value(value)?;
        self.registration().post(message).await
    }

    pub async fn handle_push(&self, data: Option<&[u8]>) -> Result<Notification, Error> {
        let notification = Notification::from_push(data);
        self.host.show_notification(&notification).await?;
        Ok(notification)
    }

    pub fn classify(&self, request: &InterceptedRequest) -> RoutingClass {
        self.classifier.classify_request(request)
    }

    pub fn registration(&self) -> Registration {
        Registration::new(self.lifecycle.clone())
    }

    pub fn lifecycle(&self) -> &LifecycleController {
        &self.lifecycle
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    pub fn gate(&self) -> &SuspensionGate {
        &self.gate
    }

    pub fn db(&self) -> &CacheDb {
        &self.db
    }

    pub fn strategies(&self) -> &StrategyEngine {
        &self.strategies
    }

    /// Wait for background refreshes to finish.
    pub async fn shutdown(&self) {
        self.strategies.drain_background().await;
        tracing::info!("cache controller stopped");
    }
}
