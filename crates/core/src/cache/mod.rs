//! SQLite-backed cache storage for named, versioned stores.
//!
//! This module provides a persistent request/response cache using SQLite
//! with async access via tokio-rusqlite. It supports:
//!
//! - Named stores that can be opened, enumerated and deleted as a unit
//! - Entries keyed by a SHA-256 of method and normalized URL
//! - Automatic schema migrations
//! - WAL mode for concurrent access

pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;
pub mod stores;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::{MatchMode, StoredEntry};
pub use stores::StoreInfo;
