use serde_json::Value;

use crate::{
    error::JsonRpcError, notification::JsonRpcNotification, request::JsonRpcRequest,
    types::RequestId,
};

/// One inbound JSON-RPC message
#[derive(Debug, Clone)]
pub enum JsonRpcMessage {
    Request(JsonRpcRequest),
    Notification(JsonRpcNotification),
    /// A client's reply to a server-initiated request. Accepted, never answered.
    Response(Value),
}

impl JsonRpcMessage {
    /// Method name (`None` for client replies)
    pub fn method(&self) -> Option<&str> {
        match self {
            JsonRpcMessage::Request(req) => Some(&req.method),
            JsonRpcMessage::Notification(notif) => Some(&notif.method),
            JsonRpcMessage::Response(_) => None,
        }
    }

}

/// Classify an already-decoded JSON value as a JSON-RPC message
pub fn parse_json_rpc_message(value: Value) -> Result<JsonRpcMessage, JsonRpcError> {
    let Some(obj) = value.as_object() else {
        return Err(JsonRpcError::invalid_request(None, None));
    };

    let id = obj.get("id").and_then(RequestId::from_value);

    match obj.get("jsonrpc") {
        Some(version) if version == crate::JSONRPC_VERSION => {}
        _ => return Err(JsonRpcError::invalid_request(id, None)),
    }

    if !obj.contains_key("method") {
        if obj.contains_key("id") && (obj.contains_key("result") || obj.contains_key("error")) {
            return Ok(JsonRpcMessage::Response(value));
        }
        return Err(JsonRpcError::invalid_request(id, None));
    }

    if obj.contains_key("id") {
        serde_json::from_value::<JsonRpcRequest>(value)
            .map(JsonRpcMessage::Request)
            .map_err(|_| JsonRpcError::invalid_request(id, None))
    } else {
        serde_json::from_value::<JsonRpcNotification>(value)
            .map(JsonRpcMessage::Notification)
            .map_err(|_| JsonRpcError::invalid_request(None, None))
    }
}

/// A decoded POST body: one message or a batch
#[derive(Debug)]
pub struct JsonRpcBody {
    /// Each entry is the parsed message or the error reply it earned
    pub messages: Vec<Result<JsonRpcMessage, JsonRpcError>>,
    pub is_batch: bool,
}

impl JsonRpcBody {
    /// Classify an already-decoded body
    pub fn from_value(value: Value) -> Result<Self, JsonRpcError> {
        match value {
            Value::Array(items) => {
                if items.is_empty() {
                    return Err(JsonRpcError::invalid_request(None, None));
                }
                Ok(JsonRpcBody {
                    messages: items.into_iter().map(parse_json_rpc_message).collect(),
                    is_batch: true,
                })
            }
            other => Ok(JsonRpcBody {
                messages: vec![parse_json_rpc_message(other)],
                is_batch: false,
            }),
        }
    }

    /// Number of entries that need a reply (requests and malformed entries)
    pub fn reply_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| matches!(m, Ok(JsonRpcMessage::Request(_)) | Err(_)))
            .count()
    }

    /// True when nothing in the body expects a reply
    pub fn is_notification_only(&self) -> bool {
        self.reply_count() == 0
    }
}

/// Decode a request body.
///
/// Malformed JSON fails outright with a parse error. An empty batch is a
/// single invalid-request error. Otherwise every element is classified on
/// its own so one bad entry does not sink the batch.
pub fn parse_json_rpc_body(body: &str) -> Result<JsonRpcBody, JsonRpcError> {
    let value: Value = serde_json::from_str(body).map_err(|_| JsonRpcError::parse_error())?;
    JsonRpcBody::from_value(value)
}
