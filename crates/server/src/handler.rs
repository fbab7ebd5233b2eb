//! MCP server handler implementation.
//!
//! This module defines the host handler that routes tool calls from the page
//! controller to the worker.

use std::sync::Arc;

use crate::tools::cache::{CacheGetParams, CachePartitionsParams, get_impl, partitions_impl};
use crate::tools::proxy_fetch::fetch_impl;
use crate::tools::proxy_message::message_impl;
use crate::tools::proxy_push::{click_impl, push_impl};
use crate::tools::{NotificationClickParams, ProxyFetchParams, ProxyMessageParams, ProxyPushParams};

use pwa_client::{Network, Worker};
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The MCP host for one worker version.
#[derive(Clone)]
pub struct ProxyHost {
    worker: Arc<Worker>,
    /// Used for requests the worker does not intercept.
    network: Arc<dyn Network>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
#[tool_router]
impl ProxyHost {
    pub fn new(worker: Arc<Worker>, network: Arc<dyn Network>) -> Self {
        Self { worker, network, tool_router: Self::tool_router() }
    }

    #[tool(
        description = "Issue a page request through the proxy. Same-origin requests are answered by the worker's caching strategies; others are fetched directly."
    )]
    async fn proxy_fetch(&self, params: Parameters<ProxyFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.worker, self.network.as_ref(), params.0).await
    }

    #[tool(
        description = "Send a control message to the worker: force-activate, report-version or clear-cache. Returns the reply, if any."
    )]
    async fn proxy_message(&self, params: Parameters<ProxyMessageParams>) -> Result<CallToolResult, McpError> {
        message_impl(&self.worker, params.0).await
    }

    #[tool(description = "Deliver a push payload. Returns the notification to display, or null.")]
    async fn proxy_push(&self, params: Parameters<ProxyPushParams>) -> Result<CallToolResult, McpError> {
        push_impl(&self.worker, params.0).await
    }

    #[tool(description = "Report a notification click. Returns whether to close it and which window to open.")]
    async fn notification_click(&self, params: Parameters<NotificationClickParams>) -> Result<CallToolResult, McpError> {
        click_impl(&self.worker, params.0).await
    }

    #[tool(description = "List cache partitions with entry counts and the worker's lifecycle state.")]
    async fn cache_partitions(&self, params: Parameters<CachePartitionsParams>) -> Result<CallToolResult, McpError> {
        partitions_impl(&self.worker, params.0).await
    }

    #[tool(description = "Read the cached response for a request from one partition or from any partition.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.worker, params.0).await
    }
}

impl ServerHandler for ProxyHost {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "pwa-proxy".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{TableNetwork, active_worker};

    #[tokio::test]
    async fn test_registers_every_tool() {
        let network = Arc::new(TableNetwork::default());
        let worker = active_worker(network.clone()).await;
        let host = ProxyHost::new(worker, network);

        let mut names: Vec<String> = host.tool_router.list_all().into_iter().map(|t| t.name.to_string()).collect();
        names.sort();
        assert_eq!(
            names,
            vec!["cache_get", "cache_partitions", "notification_click", "proxy_fetch", "proxy_message", "proxy_push"]
        );
    }
}
