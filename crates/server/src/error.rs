//! Structured errors for the pwa-proxy host tools.

use pwa_client::fetch::UrlError;
use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Errors raised while decoding tool parameters or encoding tool output.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// Invalid input parameters (e.g., an unknown partition).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// The request URL could not be resolved against the application origin.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(#[from] UrlError),

    /// Tool output could not be serialized.
    #[error("OUTPUT_ERROR: {0}")]
    Output(#[from] serde_json::Error),
}

impl From<HostError> for McpError {
    fn from(err: HostError) -> Self {
        let code = match &err {
            HostError::InvalidInput(_) => -32602,
            HostError::InvalidUrl(_) => -32003,
            HostError::Output(_) => -32603,
        };

        McpError { code: ErrorCode(code), message: err.to_string().into(), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url_code() {
        let err: McpError = HostError::from(UrlError::Empty).into();
        assert_eq!(err.code, ErrorCode(-32003));
        assert!(err.message.starts_with("INVALID_URL"));
    }

    #[test]
    fn test_output_error_code() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: McpError = HostError::from(serde_err).into();
        assert_eq!(err.code, ErrorCode(-32603));
    }
}
