//! # JSON-RPC Prelude
//!
//! ```rust
//! use session_router_json_rpc::prelude::*;
//! ```

pub use crate::error::{JsonRpcError, JsonRpcErrorCode, JsonRpcErrorObject};
pub use crate::message::{JsonRpcBody, JsonRpcMessage, parse_json_rpc_body};
pub use crate::notification::JsonRpcNotification;
pub use crate::request::{JsonRpcRequest, RequestParams};
pub use crate::response::{JsonRpcReply, JsonRpcResponse, ResponseResult};
pub use crate::types::{JsonRpcVersion, RequestId};

pub use crate::error_codes::*;
