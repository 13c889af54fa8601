use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{request::RequestParams, types::JsonRpcVersion};

/// A JSON-RPC notification (a request without an id; never answered)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcNotification {
    #[serde(rename = "jsonrpc")]
    pub version: JsonRpcVersion,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<RequestParams>,
}

impl JsonRpcNotification {
    pub fn new(method: impl Into<String>, params: Option<RequestParams>) -> Self {
        Self {
            version: JsonRpcVersion::V2_0,
            method: method.into(),
            params,
        }
    }

    pub fn new_with_object_params(method: impl Into<String>, params: Map<String, Value>) -> Self {
        Self::new(method, Some(RequestParams::Object(params)))
    }
}
