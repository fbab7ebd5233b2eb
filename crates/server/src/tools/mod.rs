//! MCP tool implementations.
//!
//! This module contains all tools exposed by the pwa-proxy host.

pub mod cache;
pub mod proxy_fetch;
pub mod proxy_message;
pub mod proxy_push;

#[cfg(test)]
pub(crate) mod testing;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::HostError;

pub use proxy_fetch::ProxyFetchParams;
pub use proxy_message::ProxyMessageParams;
pub use proxy_push::{NotificationClickParams, ProxyPushParams};

/// How a response body is carried in tool output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum BodyEncoding {
    /// The body is valid UTF-8 and is returned as-is.
    Utf8,
    /// Standard base64 of the raw bytes (images, fonts, anything not UTF-8).
    Base64,
}

/// Encode a body losslessly: text stays readable, everything else is base64.
pub(crate) fn encode_body(body: &[u8]) -> (BodyEncoding, String) {
    match std::str::from_utf8(body) {
        Ok(text) => (BodyEncoding::Utf8, text.to_string()),
        Err(_) => (BodyEncoding::Base64, STANDARD.encode(body)),
    }
}

/// Wrap tool output as pretty-printed JSON text content.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output).map_err(HostError::from)?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
