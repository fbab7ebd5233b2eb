//! proxy_fetch tool implementation.
//!
//! Delivers a page request to the worker as a fetch event. Requests the
//! worker does not intercept are fetched directly, bypassing the partitions.

use pwa_client::{EventOutcome, Network, ResponseSource, Route, Worker, WorkerEvent, fetch::parse_request_url};
use pwa_core::{Destination, ProxyRequest, ProxyResponse};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{BodyEncoding, encode_body, json_result};
use crate::error::HostError;

/// Input parameters for proxy_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProxyFetchParams {
    /// Absolute URL, or a path resolved against the application origin.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default = "default_method")]
    pub method: String,

    /// Request destination: document, image, style, script, font, manifest or empty.
    #[serde(default)]
    pub destination: Destination,
}

fn default_method() -> String {
    "GET".into()
}

/// Output structure for proxy_fetch tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ProxyFetchOutput {
    /// The request URL after resolution.
    pub url: String,
    /// Whether the worker handled the request.
    pub intercepted: bool,
    pub route: Route,
    pub source: ResponseSource,
    pub status: u16,
    pub content_type: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body_encoding: BodyEncoding,
    /// Response body, encoded as `body_encoding` says.
    pub body: String,
}

impl ProxyFetchOutput {
    fn new(request: &ProxyRequest, route: Route, source: ResponseSource, response: ProxyResponse) -> Self {
        let (body_encoding, body) = encode_body(&response.body);
        Self {
            url: request.url.to_string(),
            intercepted: route != Route::Passthrough,
            route,
            source,
            status: response.status,
            content_type: response.content_type().map(str::to_string),
            headers: response.headers,
            body_encoding,
            body,
        }
    }
}

/// Implementation of the proxy_fetch tool.
pub async fn fetch_impl(
    worker: &Worker, network: &dyn Network, params: ProxyFetchParams,
) -> Result<CallToolResult, McpError> {
    if params.method.trim().is_empty() {
        return Err(HostError::InvalidInput("method cannot be empty".into()).into());
    }

    let url = parse_request_url(&params.url, Some(&worker.config().scope)).map_err(HostError::from)?;
    let request = ProxyRequest::new(&params.method, url, params.destination);

    let output = match worker.dispatch(WorkerEvent::Fetch(request.clone())).await? {
        EventOutcome::Resolved(resolution) => {
            ProxyFetchOutput::new(&request, resolution.route, resolution.source, resolution.response)
        }
        EventOutcome::Passthrough => {
            tracing::debug!("fetching {} directly", request.url);
            let response = network.fetch(&request).await?;
            ProxyFetchOutput::new(&request, Route::Passthrough, ResponseSource::Network, response)
        }
        other => {
            return Err(HostError::InvalidInput(format!("unexpected fetch outcome: {other:?}")).into());
        }
    };

    json_result(&output)
}
