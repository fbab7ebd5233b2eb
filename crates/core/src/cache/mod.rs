//! SQLite-backed partitioned response cache.
//!
//! This module provides named cache partitions holding request → response
//! entries, using SQLite with async access via tokio-rusqlite. It supports:
//!
//! - Request keys derived from method + URL (SHA-256)
//! - Automatic schema migrations
//! - WAL mode for concurrent access
//! - Atomic multi-entry writes for manifest pre-caching
//! - Cross-partition lookups in partition creation order

pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;
pub mod partitions;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::EntryMeta;
pub use partitions::{PartitionInfo, PartitionNames};
