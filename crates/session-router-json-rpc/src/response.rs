use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::JsonRpcError;
use crate::types::{JsonRpcVersion, RequestId};

/// Result data of a successful reply
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseResult {
    Success(Value),
    Null,
}

impl ResponseResult {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            ResponseResult::Success(value) => Some(value),
            ResponseResult::Null => None,
        }
    }
}

impl From<Value> for ResponseResult {
    fn from(value: Value) -> Self {
        if value.is_null() {
            ResponseResult::Null
        } else {
            ResponseResult::Success(value)
        }
    }
}

/// A successful JSON-RPC reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(rename = "jsonrpc")]
    pub version: JsonRpcVersion,
    pub id: RequestId,
    pub result: ResponseResult,
}

impl JsonRpcResponse {
    pub fn new(id: RequestId, result: ResponseResult) -> Self {
        Self {
            version: JsonRpcVersion::V2_0,
            id,
            result,
        }
    }

    pub fn success(id: RequestId, result: Value) -> Self {
        Self::new(id, ResponseResult::Success(result))
    }
}

/// Either kind of reply to a request. Success and error stay separate types
/// so a reply can never carry both `result` and `error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonRpcReply {
    Response(JsonRpcResponse),
    Error(JsonRpcError),
}

impl JsonRpcReply {
    pub fn is_error(&self) -> bool {
        matches!(self, JsonRpcReply::Error(_))
    }

    pub fn id(&self) -> Option<&RequestId> {
        match self {
            JsonRpcReply::Response(resp) => Some(&resp.id),
            JsonRpcReply::Error(err) => err.id.as_ref(),
        }
    }

    /// The `result` payload of a successful reply
    pub fn result(&self) -> Option<&Value> {
        match self {
            JsonRpcReply::Response(resp) => resp.result.as_value(),
            JsonRpcReply::Error(_) => None,
        }
    }
}

impl From<JsonRpcResponse> for JsonRpcReply {
    fn from(response: JsonRpcResponse) -> Self {
        Self::Response(response)
    }
}

impl From<JsonRpcError> for JsonRpcReply {
    fn from(error: JsonRpcError) -> Self {
        Self::Error(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_reply_shape() {
        let reply: JsonRpcReply =
            JsonRpcResponse::success(RequestId::Number(4), json!({"content": []})).into();

        assert!(!reply.is_error());
        assert_eq!(reply.id(), Some(&RequestId::Number(4)));
        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            json!({"jsonrpc": "2.0", "id": 4, "result": {"content": []}})
        );
    }

    #[test]
    fn test_error_reply_has_no_result() {
        let reply: JsonRpcReply =
            JsonRpcError::method_not_found(RequestId::from("x"), "nope").into();

        assert!(reply.is_error());
        assert!(reply.result().is_none());
        let json = serde_json::to_value(&reply).unwrap();
        assert!(json.get("result").is_none());
        assert_eq!(json["error"]["code"], -32601);
    }

    #[test]
    fn test_null_result_conversion() {
        assert!(matches!(ResponseResult::from(json!(null)), ResponseResult::Null));
        assert!(matches!(
            ResponseResult::from(json!({})),
            ResponseResult::Success(_)
        ));
    }
}
