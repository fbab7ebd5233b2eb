//! Out-of-band commands from the page controller.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::oneshot;

use super::Worker;

/// A command received over the message channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ControlMessage {
    ForceActivate,
    ReportVersion,
    ClearCache,
}

impl ControlMessage {
    /// Parse a raw message; unknown kinds and malformed payloads yield `None`.
    pub fn parse(data: &Value) -> Option<Self> {
        serde_json::from_value(data.clone()).ok()
    }
}

/// Reply posted back on the message's reply channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(untagged)]
pub enum ControlReply {
    Version { version: String },
    Cleared { success: bool },
}

impl Worker {
    /// Run one control command.
    ///
    /// Unknown commands are logged and dropped. Commands that reply still run
    /// when `reply` is absent.
    pub async fn handle_message(&self, data: &Value, reply: Option<oneshot::Sender<ControlReply>>) {
        let Some(message) = ControlMessage::parse(data) else {
            tracing::info!(%data, "ignoring unrecognized message");
            return;
        };
        tracing::debug!(?message, "control message");

        let answer = match message {
            ControlMessage::ForceActivate => {
                self.force_activate().await;
                None
            }
            ControlMessage::ReportVersion => {
                Some(ControlReply::Version { version: self.config.partitions.static_name.clone() })
            }
            ControlMessage::ClearCache => {
                let report = self.prune_stale_partitions().await;
                Some(ControlReply::Cleared { success: report.is_clean() })
            }
        };

        if let Some(answer) = answer {
            match reply {
                Some(channel) => {
                    if channel.send(answer).is_err() {
                        tracing::warn!(?message, "reply channel closed before the answer was sent");
                    }
                }
                None => tracing::warn!(?message, "no reply channel for message"),
            }
        }
    }

    async fn force_activate(&self) {
        let ready = {
            let mut lifecycle = self.lifecycle.write().await;
            lifecycle.skip_waiting();
            lifecycle.may_activate()
        };
        if !ready {
            tracing::debug!("skip-waiting recorded; worker is not waiting");
            return;
        }
        if let Err(e) = self.activate().await {
            tracing::warn!("forced activation failed: {e}");
        }
    }
}
