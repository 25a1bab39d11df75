//! Core types and shared functionality for swcache.
//!
//! This crate provides:
//! - Versioned cache stores with a SQLite backend
//! - Request/response snapshots and the request classifier
//! - The shell asset registry
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod generation;
pub mod http;
pub mod registry;
pub mod route;

pub use cache::{CacheDb, MatchMode, StoreInfo, StoredEntry};
pub use config::AppConfig;
pub use error::Error;
pub use generation::{CacheGeneration, StoreRole};
pub use http::{InterceptedRequest, ResponseSnapshot};
pub use registry::ShellAssetRegistry;
pub use route::{RequestClassifier, RoutingClass};
