//! proxy_push and notification_click tool implementations.

use bytes::Bytes;
use pwa_client::{EventOutcome, Notification, Worker, WorkerEvent};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;
use crate::error::HostError;

/// Input parameters for proxy_push tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProxyPushParams {
    /// Raw push payload, normally a JSON object `{title?, body?, tag?}`.
    #[serde(default)]
    pub payload: Option<String>,
}

/// Output structure for proxy_push tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ProxyPushOutput {
    /// Notification to display; null when the push was ignored.
    pub notification: Option<Notification>,
}

/// Input parameters for notification_click tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NotificationClickParams {
    /// Action id that was clicked; absent for a click on the notification body.
    #[serde(default)]
    pub action: Option<String>,
}

/// Output structure for notification_click tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NotificationClickOutput {
    /// Whether the notification should be closed.
    pub close: bool,
    /// Window to open or focus, if any.
    pub open_window: Option<String>,
}

/// Implementation of the proxy_push tool.
pub async fn push_impl(worker: &Worker, params: ProxyPushParams) -> Result<CallToolResult, McpError> {
    let payload = params.payload.map(Bytes::from);
    let notification = match worker.dispatch(WorkerEvent::Push { payload }).await? {
        EventOutcome::ShowNotification(notification) => Some(notification),
        EventOutcome::Ignored => None,
        other => return Err(HostError::InvalidInput(format!("unexpected push outcome: {other:?}")).into()),
    };

    json_result(&ProxyPushOutput { notification })
}

/// Implementation of the notification_click tool.
pub async fn click_impl(worker: &Worker, params: NotificationClickParams) -> Result<CallToolResult, McpError> {
    let open_window = match worker
        .dispatch(WorkerEvent::NotificationClick { action: params.action })
        .await?
    {
        EventOutcome::OpenWindow(url) => Some(url.to_string()),
        EventOutcome::CloseNotification => None,
        other => return Err(HostError::InvalidInput(format!("unexpected click outcome: {other:?}")).into()),
    };

    json_result(&NotificationClickOutput { close: true, open_window })
}
