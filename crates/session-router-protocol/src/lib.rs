//! # MCP Protocol Types
//!
//! The subset of the Model Context Protocol the session router speaks:
//! the initialize handshake and version negotiation, tool listing and
//! invocation, and `notifications/message` logging.

pub mod content;
pub mod initialize;
pub mod logging;
pub mod ping;
pub mod prelude;
pub mod tools;
pub mod version;

// Re-export main types
pub use content::ContentBlock;
pub use initialize::{
    ClientCapabilities, Implementation, InitializeRequest, InitializeResult, LoggingCapabilities,
    ServerCapabilities, ToolsCapabilities,
};
pub use logging::{LoggingLevel, LoggingMessageNotification, LoggingMessageParams, SetLevelParams};
pub use ping::EmptyResult;
pub use tools::{CallToolParams, CallToolResult, ListToolsResult, Tool, ToolSchema};
pub use version::McpVersion;

use session_router_json_rpc::{JsonRpcError, JsonRpcErrorObject, RequestId};

/// Method names the router understands
pub mod methods {
    pub const INITIALIZE: &str = "initialize";
    pub const PING: &str = "ping";
    pub const TOOLS_LIST: &str = "tools/list";
    pub const TOOLS_CALL: &str = "tools/call";
    pub const LOGGING_SET_LEVEL: &str = "logging/setLevel";
    pub const NOTIFICATION_MESSAGE: &str = "notifications/message";
    pub const NOTIFICATION_INITIALIZED: &str = "notifications/initialized";
}

/// Result type for MCP operations
pub type McpResult<T> = Result<T, McpError>;

/// MCP-specific errors
#[derive(Debug, thiserror::Error)]
pub enum McpError {
    #[error("Protocol version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },

    #[error("Tool {0} not found")]
    ToolNotFound(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Invalid Request: Server already initialized")]
    AlreadyInitialized,

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl McpError {
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParameters(message.into())
    }

    /// Map to the JSON-RPC error object sent on the wire
    pub fn to_error_object(&self) -> JsonRpcErrorObject {
        match self {
            McpError::InvalidParameters(_)
            | McpError::ToolNotFound(_)
            | McpError::VersionMismatch { .. } => {
                JsonRpcErrorObject::invalid_params(&self.to_string())
            }
            McpError::AlreadyInitialized => {
                JsonRpcErrorObject::invalid_request(Some(self.to_string()))
            }
            McpError::SerializationError(err) => {
                JsonRpcErrorObject::internal_error(Some(format!("Serialization error: {}", err)))
            }
        }
    }

    /// Build a JSON-RPC error reply for this error
    pub fn to_json_rpc_error(&self, id: Option<RequestId>) -> JsonRpcError {
        JsonRpcError::new(id, self.to_error_object())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        let not_found = McpError::ToolNotFound("shout".into()).to_error_object();
        assert_eq!(not_found.code, -32602);
        assert_eq!(not_found.message, "Tool shout not found");

        let again = McpError::AlreadyInitialized.to_error_object();
        assert_eq!(again.code, -32600);
        assert_eq!(again.message, "Invalid Request: Server already initialized");

        let bad = McpError::invalid_params("name must be a string").to_error_object();
        assert_eq!(bad.code, -32602);
    }
}
