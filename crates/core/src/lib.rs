//! Core types and shared functionality for pwa-proxy.
//!
//! This crate provides:
//! - Partitioned response cache with SQLite backend
//! - Request/response types exchanged between the page and the proxy
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod exchange;

pub use cache::{CacheDb, EntryMeta, PartitionInfo, PartitionNames};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use exchange::{Destination, ProxyRequest, ProxyResponse};
