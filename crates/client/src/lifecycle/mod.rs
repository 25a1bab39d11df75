//! Install, activate and promotion of a cache controller version.
//!
//! State machine:
//!
//! ```text
//! Parsed ──install──▶ Installing ──▶ Waiting ──skip-waiting/activate──▶ Activating ──▶ Active
//!                         │  └──────(no pages, or promotion requested)──────▶│
//!                         └──store open failed──▶ Redundant
//! ```
//!
//! Transitions are compare-and-set on a watch channel, so two concurrent
//! activations cannot both run the prune.

pub mod gate;
pub mod notify;

pub use gate::{SuspensionGate, SuspensionGuard};
pub use notify::{ControlMessage, Registration, WorkerMessage};

use crate::fetch::{FetchMode, Network};
use crate::host::Host;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use swcache_core::{AppConfig, CacheDb, Error, InterceptedRequest, MatchMode, ShellAssetRegistry};
use tokio::sync::watch;

/// Lifecycle state of this controller version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Parsed,
    Installing,
    Waiting,
    Activating,
    Active,
    /// Installation failed; a prior version, if any, keeps control.
    Redundant,
}

/// A shell asset the install sweep could not cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedAsset {
    pub url: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallReport {
    pub store: String,
    pub cached: Vec<String>,
    pub skipped: Vec<SkippedAsset>,
    /// Present when install promoted straight to Active.
    pub promoted: Option<ActivationReport>,
    pub state: LifecycleState,
    pub completed_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivationReport {
    pub deleted: Vec<String>,
    pub retained: Vec<String>,
    /// Stale stores whose deletion failed.
    pub failed: Vec<String>,
    pub claimed: bool,
    /// Pages that received `update-applied`.
    pub notified: usize,
    pub completed_at: String,
}

pub struct LifecycleController {
    db: CacheDb,
    network: Arc<dyn Network>,
    host: Arc<dyn Host>,
    registry: ShellAssetRegistry,
    shell_store: String,
    api_store: String,
    gate: SuspensionGate,
    state: watch::Sender<LifecycleState>,
    promote_requested: AtomicBool,
}

impl LifecycleController {
    pub fn new(
        config: &AppConfig, db: CacheDb, network: Arc<dyn Network>, host: Arc<dyn Host>, gate: SuspensionGate,
    ) -> Result<Self, Error> {
        let (state, _) = watch::channel(LifecycleState::Parsed);
        Ok(Self {
            db,
            network,
            host,
            registry: config.shell_registry()?,
            shell_store: config.shell_generation().store_name(),
            api_store: config.api_generation().store_name(),
            gate,
            state,
            promote_requested: AtomicBool::new(false),
        })
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    pub fn gate(&self) -> &SuspensionGate {
        &self.gate
    }

    /// Names of the stores this version keeps.
    pub fn current_stores(&self) -> [&str; 2] {
        [&self.shell_store, &self.api_store]
    }

    fn transition(&self, from: &[LifecycleState], to: LifecycleState) -> Result<LifecycleState, LifecycleState> {
        let mut previous = self.state();
        let moved = self.state.send_if_modified(|state| {
            previous = *state;
            if from.contains(state) {
                *state = to;
                true
            } else {
                false
            }
        });
        if moved {
            tracing::info!("lifecycle {previous:?} -> {to:?}");
            Ok(previous)
        } else {
            Err(previous)
        }
    }

    fn set_state(&self, to: LifecycleState) {
        let previous = self.state.send_replace(to);
        tracing::info!("lifecycle {previous:?} -> {to:?}");
    }

    /// Pre-warm the shell store.
    ///
    /// Each asset is fetched bypassing HTTP caches. Assets that fail or come
    /// back non-OK are skipped; only failing to open the store aborts the
    /// install, leaving this version Redundant.
    pub async fn install(&self) -> Result<InstallReport, Error> {
        self.transition(&[LifecycleState::Parsed, LifecycleState::Redundant], LifecycleState::Installing)
            .map_err(|state| Error::Lifecycle(format!("cannot install from {state:?}")))?;

        if let Err(e) = self.db.open_store(&self.shell_store).await {
            tracing::error!("install aborted: {e}");
            self.set_state(LifecycleState::Redundant);
            return Err(e);
        }

        let mut cached = Vec::new();
        let mut skipped = Vec::new();

        for url in self.registry.urls() {
            let request = InterceptedRequest::get(url);
            let reason = match self.network.fetch(&request, FetchMode::Reload).await {
                Ok(response) if response.ok() => {
                    match self
                        .db
                        .put_entry(&self.shell_store, "GET", &request.url, MatchMode::IgnoreQuery, &response)
                        .await
                    {
                        Ok(()) => {
                            cached.push(request.url.to_string());
                            continue;
                        }
                        Err(e) => e.to_string(),
                    }
                }
                Ok(response) => format!("HTTP {}", response.status),
                Err(e) => e.to_string(),
            };
            tracing::warn!("skipping shell asset {}: {reason}", request.url);
            skipped.push(SkippedAsset { url: request.url.to_string(), reason });
        }

        tracing::info!(cached = cached.len(), skipped = skipped.len(), "shell store {} warmed", self.shell_store);

        let controlled = !self.host.pages().await.is_empty();
        let promoted = if !controlled || self.promote_requested.swap(false, Ordering::SeqCst) {
            self.set_state(LifecycleState::Activating);
            Some(self.run_activation().await)
        } else {
            self.set_state(LifecycleState::Waiting);
            // A promotion can land between the check above and entering Waiting.
            if self.promote_requested.swap(false, Ordering::SeqCst)
                && self.transition(&[LifecycleState::Waiting], LifecycleState::Activating).is_ok()
            {
                Some(self.run_activation().await)
            } else {
                None
            }
        };

        Ok(InstallReport {
            store: self.shell_store.clone(),
            cached,
            skipped,
            promoted,
            state: self.state(),
            completed_at: chrono::Utc::now().to_rfc3339(),
        })
    }

    /// Take over from a waiting state.
    pub async fn activate(&self) -> Result<ActivationReport, Error> {
        self.transition(&[LifecycleState::Waiting], LifecycleState::Activating)
            .map_err(|state| Error::Lifecycle(format!("cannot activate from {state:?}")))?;
        Ok(self.run_activation().await)
    }

    /// Handle the promotion command.
    ///
    /// Waiting activates now. Before install finishes the request is
    /// remembered. Otherwise it is ignored and `None` is returned.
    pub async fn skip_waiting(&self) -> Result<Option<ActivationReport>, Error> {
        match self.state() {
            LifecycleState::Parsed | LifecycleState::Installing => {
                self.promote_requested.store(true, Ordering::SeqCst);
                tracing::info!("promotion requested before install finished");
                Ok(None)
            }
            LifecycleState::Waiting => match self.activate().await {
                Ok(report) => Ok(Some(report)),
                Err(Error::Lifecycle(_)) => Ok(None),
                Err(e) => Err(e),
            },
            state => {
                tracing::debug!("ignoring promotion in state {state:?}");
                Ok(None)
            }
        }
    }

    /// Prune stale stores, claim pages and announce the update.
    ///
    /// Entered in Activating. Never fails: every step logs its own failure.
    async fn run_activation(&self) -> ActivationReport {
        let mut report = ActivationReport::default();

        {
            let _suspended = self.gate.suspend();

            let names = self.db.store_names().await.unwrap_or_else(|e| {
                tracing::warn!("could not enumerate stores, nothing pruned: {e}");
                Vec::new()
            });

            for name in names {
                if self.current_stores().contains(&name.as_str()) {
                    report.retained.push(name);
                    continue;
                }
                match self.db.delete_store(&name).await {
                    Ok(_) => {
                        tracing::info!("deleted stale store {name}");
                        report.deleted.push(name);
                    }
                    Err(e) => {
                        tracing::warn!("failed to delete stale store {name}: {e}");
                        report.failed.push(name);
                    }
                }
            }

            match self.host.claim().await {
                Ok(()) => report.claimed = true,
                Err(e) => tracing::warn!("failed to claim pages: {e}"),
            }
        }

        self.set_state(LifecycleState::Active);

        for page in self.host.pages().await {
            match self.host.post_message(page, &WorkerMessage::UpdateApplied).await {
                Ok(()) => report.notified += 1,
                Err(e) => tracing::debug!("page {page} missed update-applied: {e}"),
            }
        }

        report.completed_at = chrono::Utc::now().to_rfc3339();
        report
    }
}
