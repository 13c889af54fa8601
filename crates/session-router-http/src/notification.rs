//! Session-scoped notification capability handed to tool handlers
//!
//! Notifications and replies share one ordered queue per POST request, so a
//! handler's notifications always precede its own result on the wire.

use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use session_router_json_rpc::{JsonRpcNotification, JsonRpcReply};
use session_router_protocol::{LoggingLevel, LoggingMessageNotification};

/// One frame written to a request's response stream
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum OutboundFrame {
    Notification(JsonRpcNotification),
    Reply(JsonRpcReply),
}

/// Errors raised while emitting a notification
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Sends notifications on the response stream of the request currently
/// being handled.
///
/// Cheap to clone. If the client has gone away the frame is dropped and the
/// handler keeps running.
#[derive(Debug, Clone)]
pub struct NotificationSender {
    session_id: String,
    sink: UnboundedSender<OutboundFrame>,
    min_level: Option<LoggingLevel>,
}

impl NotificationSender {
    pub fn new(
        session_id: impl Into<String>,
        sink: UnboundedSender<OutboundFrame>,
        min_level: Option<LoggingLevel>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            sink,
            min_level,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Queue an arbitrary JSON-RPC notification
    pub fn send_notification(&self, notification: JsonRpcNotification) {
        let method = notification.method.clone();
        if self.sink.send(OutboundFrame::Notification(notification)).is_err() {
            debug!(
                "Dropping {} notification for session {}: response stream closed",
                method, self.session_id
            );
        }
    }

    /// Queue a `notifications/message` log entry, honouring the session's
    /// `logging/setLevel` threshold
    pub fn send_log_message(
        &self,
        level: LoggingLevel,
        data: impl Into<Value>,
    ) -> Result<(), NotificationError> {
        if let Some(threshold) = self.min_level.filter(|t| !level.should_log(*t)) {
            debug!(
                "Suppressing {:?} log message for session {} (threshold {:?})",
                level, self.session_id, threshold
            );
            return Ok(());
        }

        let notification = LoggingMessageNotification::new(level, data.into()).to_json_rpc()?;
        self.send_notification(notification);
        Ok(())
    }
}
