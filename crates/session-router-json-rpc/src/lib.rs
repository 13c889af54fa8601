//! # JSON-RPC 2.0 Message Types
//!
//! Transport-agnostic JSON-RPC 2.0 types used by the session router:
//! requests, notifications, success replies, error envelopes, and the
//! parsing rules for single and batch request bodies.
//!
//! Nothing in this crate knows about HTTP or sessions. The HTTP crate decides
//! which envelope goes out with which status code.

pub mod error;
pub mod message;
pub mod notification;
pub mod prelude;
pub mod request;
pub mod response;
pub mod types;

// Re-export main types
pub use error::{JsonRpcError, JsonRpcErrorCode, JsonRpcErrorObject};
pub use message::{JsonRpcBody, JsonRpcMessage, parse_json_rpc_body, parse_json_rpc_message};
pub use notification::JsonRpcNotification;
pub use request::{JsonRpcRequest, RequestParams};
pub use response::{JsonRpcReply, JsonRpcResponse, ResponseResult};
pub use types::{JsonRpcVersion, RequestId};

/// JSON-RPC 2.0 version constant
pub const JSONRPC_VERSION: &str = "2.0";

/// Implementation-defined server error range
pub mod error_codes {
    pub const SERVER_ERROR_START: i64 = -32099;
    pub const SERVER_ERROR_END: i64 = -32000;
}
