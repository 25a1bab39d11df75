//! Messages between the controller and its pages, and the page-side view
//! of the controller's lifecycle.

use super::{ActivationReport, LifecycleController, LifecycleState};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use swcache_core::Error;
use tokio::task::JoinHandle;

/// Message posted from the controller to a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum WorkerMessage {
    /// A new version took control; the page may want to reload.
    UpdateApplied,
}

/// Command sent from a page to the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ControlMessage {
    #[serde(alias = "SKIP_WAITING")]
    SkipWaiting,
}

impl ControlMessage {
    pub fn from_value(value: &Value) -> Result<Self, Error> {
        serde_json::from_value(value.clone()).map_err(|e| Error::InvalidInput(format!("unrecognized message {value}: {e}")))
    }
}

/// Page-facing handle on the controller.
#[derive(Clone)]
pub struct Registration {
    controller: Arc<LifecycleController>,
}

impl Registration {
    pub fn new(controller: Arc<LifecycleController>) -> Self {
        Self { controller }
    }

    pub fn state(&self) -> LifecycleState {
        self.controller.state()
    }

    /// Whether an installed version is waiting to take over.
    pub fn waiting(&self) -> bool {
        self.state() == LifecycleState::Waiting
    }

    /// Call `callback` whenever a version is waiting.
    ///
    /// Fires once immediately if one already is, then on every transition
    /// into Waiting until the controller goes away or the handle is aborted.
    pub fn on_update_available<F>(&self, mut callback: F) -> JoinHandle<()>
    where
        F: FnMut() + Send + 'static,
    {
        let mut rx = self.controller.subscribe();
        tokio::spawn(async move {
            if *rx.borrow_and_update() == LifecycleState::Waiting {
                callback();
            }
            while rx.changed().await.is_ok() {
                if *rx.borrow_and_update() == LifecycleState::Waiting {
                    callback();
                }
            }
        })
    }

    /// Send a control command to the controller.
    pub async fn post(&self, message: ControlMessage) -> Result<Option<ActivationReport>, Error> {
        match message {
            ControlMessage::SkipWaiting => self.controller.skip_waiting().await,
        }
    }
}
