//! Cache-related MCP tools.
//!
//! Read-only views of the worker's partitions.

pub mod get;
pub mod partitions;

pub use get::{CacheGetParams, get_impl};
pub use partitions::{CachePartitionsParams, partitions_impl};
