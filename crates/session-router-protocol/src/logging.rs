//! MCP Logging Protocol Types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use session_router_json_rpc::JsonRpcNotification;

/// Logging levels, ordered by syslog severity (RFC-5424)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggingLevel {
    Debug,
    Info,
    Notice,
    Warning,
    Error,
    Critical,
    Alert,
    Emergency,
}

impl LoggingLevel {
    /// Get logging level priority (0 = debug, 7 = emergency)
    pub fn priority(&self) -> u8 {
        match self {
            LoggingLevel::Debug => 0,
            LoggingLevel::Info => 1,
            LoggingLevel::Notice => 2,
            LoggingLevel::Warning => 3,
            LoggingLevel::Error => 4,
            LoggingLevel::Critical => 5,
            LoggingLevel::Alert => 6,
            LoggingLevel::Emergency => 7,
        }
    }

    /// Check if this level should be logged at the given threshold
    pub fn should_log(&self, threshold: LoggingLevel) -> bool {
        self.priority() >= threshold.priority()
    }
}

/// Parameters for `notifications/message`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingMessageParams {
    pub level: LoggingLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logger: Option<String>,
    pub data: Value,
}

/// A complete `notifications/message` notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingMessageNotification {
    pub method: String,
    pub params: LoggingMessageParams,
}

impl LoggingMessageNotification {
    pub fn new(level: LoggingLevel, data: Value) -> Self {
        Self {
            method: crate::methods::NOTIFICATION_MESSAGE.to_string(),
            params: LoggingMessageParams {
                level,
                logger: None,
                data,
            },
        }
    }

    pub fn level(&self) -> LoggingLevel {
        self.params.level
    }

    /// Convert to a JSON-RPC notification frame
    pub fn to_json_rpc(&self) -> Result<JsonRpcNotification, serde_json::Error> {
        let params = match serde_json::to_value(&self.params)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Ok(JsonRpcNotification::new_with_object_params(
            self.method.clone(),
            params,
        ))
    }
}

/// Parameters for `logging/setLevel`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetLevelParams {
    pub level: LoggingLevel,
}
