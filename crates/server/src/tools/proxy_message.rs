//! proxy_message tool implementation.
//!
//! Posts a control message to the worker and waits for its reply, if any.

use pwa_client::{ControlReply, Worker, WorkerEvent};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use super::json_result;

/// Input parameters for proxy_message tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProxyMessageParams {
    /// Message body, e.g. `{"kind": "report-version"}`.
    pub message: serde_json::Value,
}

/// Output structure for proxy_message tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProxyMessageOutput {
    /// The worker's reply; null for commands without one and for unknown messages.
    pub reply: Option<ControlReply>,
}

/// Implementation of the proxy_message tool.
pub async fn message_impl(worker: &Worker, params: ProxyMessageParams) -> Result<CallToolResult, McpError> {
    let (tx, rx) = oneshot::channel();
    worker
        .dispatch(WorkerEvent::Message { data: params.message, reply: Some(tx) })
        .await?;

    // The sender is dropped unanswered for commands that do not reply.
    let reply = rx.await.ok();
    json_result(&ProxyMessageOutput { reply })
}
