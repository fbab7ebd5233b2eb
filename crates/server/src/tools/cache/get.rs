//! cache_get tool implementation.
//!
//! Looks up the stored response for a request, in one partition or across all.

use pwa_client::{Worker, fetch::parse_request_url};
use pwa_core::{Destination, Error, ProxyRequest};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::HostError;
use crate::tools::{BodyEncoding, encode_body, json_result};

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// Partition to search; all partitions in creation order when absent.
    #[serde(default)]
    pub partition: Option<String>,

    /// Request URL, absolute or relative to the application origin.
    pub url: String,

    /// Request method (default: GET).
    #[serde(default)]
    pub method: Option<String>,
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    pub url: String,
    pub method: String,
    pub partition: Option<String>,
    pub status: u16,
    pub content_type: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body_encoding: BodyEncoding,
    /// Stored body, encoded as `body_encoding` says.
    pub body: String,
}

/// Implementation of the cache_get tool.
pub async fn get_impl(worker: &Worker, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    let url = parse_request_url(&params.url, Some(&worker.config().scope)).map_err(HostError::from)?;
    let method = params.method.as_deref().unwrap_or("GET");
    let request = ProxyRequest::new(method, url, Destination::Empty);

    let cache = worker.cache();
    let hit = match params.partition.as_deref() {
        Some(partition) => {
            if !cache.has_partition(partition).await? {
                return Err(HostError::InvalidInput(format!("no partition named {partition}")).into());
            }
            cache.match_entry(partition, &request).await?
        }
        None => cache.match_any(&request).await?,
    };
    let response = hit.ok_or_else(|| Error::CacheMiss(format!("{} {}", request.method, request.url)))?;

    let (body_encoding, body) = encode_body(&response.body);
    let output = CacheGetOutput {
        url: request.url.to_string(),
        method: request.method,
        partition: params.partition,
        status: response.status,
        content_type: response.content_type().map(str::to_string),
        headers: response.headers,
        body_encoding,
        body,
    };
    json_result(&output)
}
