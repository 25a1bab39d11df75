//! Client side of swcache.
//!
//! This crate provides the network seam and its reqwest implementation, the
//! caching strategies, the install/activate lifecycle and the event
//! dispatcher a host drives.

pub mod fetch;
pub mod host;
pub mod lifecycle;
pub mod push;
pub mod strategy;
pub mod worker;

#[cfg(test)]
mod testing;

pub use fetch::{FetchClient, FetchConfig, FetchMode, Network, NetworkError};
pub use host::{Host, LocalHost, PageId};
pub use lifecycle::{
    ActivationReport, ControlMessage, InstallReport, LifecycleController, LifecycleState, Registration,
    SuspensionGate, WorkerMessage,
};
pub use push::Notification;
pub use strategy::{StrategyConfig, StrategyEngine};
pub use worker::{RoutedResponse, ServiceWorker, WorkerEvent, WorkerOutcome};
