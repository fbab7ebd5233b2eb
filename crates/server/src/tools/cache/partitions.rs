//! cache_partitions tool implementation.
//!
//! Lists partitions with their entries, flagging the current version's pair.

use pwa_client::{LifecycleState, Worker};
use pwa_core::{EntryMeta, PartitionInfo};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// Parameters for the cache_partitions tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CachePartitionsParams {
    /// Include per-entry metadata (no bodies).
    #[serde(default)]
    pub with_entries: bool,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct PartitionView {
    #[serde(flatten)]
    pub info: PartitionInfo,
    /// Belongs to the running worker version.
    pub current: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entries_meta: Option<Vec<EntryMeta>>,
}

/// Output from the cache_partitions tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct CachePartitionsOutput {
    pub worker_state: LifecycleState,
    pub partitions: Vec<PartitionView>,
}

/// Implementation of the cache_partitions tool.
pub async fn partitions_impl(worker: &Worker, params: CachePartitionsParams) -> Result<CallToolResult, McpError> {
    let cache = worker.cache();
    let mut partitions = Vec::new();

    for info in cache.list_partitions().await? {
        let entries_meta = if params.with_entries { Some(cache.list_entries(&info.name).await?) } else { None };
        partitions.push(PartitionView { current: worker.partitions().is_current(&info.name), info, entries_meta });
    }

    let output = CachePartitionsOutput { worker_state: worker.state().await, partitions };
    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{TableNetwork, active_worker, output_json};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_lists_current_partition() {
        let worker = active_worker(Arc::new(TableNetwork::default())).await;

        let result = partitions_impl(&worker, CachePartitionsParams::default()).await.unwrap();

        let output = output_json(&result);
        assert_eq!(output["worker_state"], "active");
        let partitions = output["partitions"].as_array().unwrap();
        assert_eq!(partitions.len(), 1);
        assert_eq!(partitions[0]["name"], "v1-static");
        assert_eq!(partitions[0]["entries"], 1);
        assert_eq!(partitions[0]["current"], true);
        assert!(partitions[0].get("entries_meta").is_none());
    }

    #[tokio::test]
    async fn test_lists_entries_on_request() {
        let worker = active_worker(Arc::new(TableNetwork::default())).await;
        worker.cache().open_partition("legacy").await.unwrap();

        let params = CachePartitionsParams { with_entries: true };
        let result = partitions_impl(&worker, params).await.unwrap();

        let output = output_json(&result);
        let partitions = output["partitions"].as_array().unwrap();
        assert_eq!(partitions[0]["entries_meta"][0]["url"], "https://app.test/index.html");
        assert_eq!(partitions[1]["name"], "legacy");
        assert_eq!(partitions[1]["current"], false);
    }
}
