//! # Session Router HTTP Transport
//!
//! Streamable HTTP transport for MCP servers that keep one channel per
//! client session.
//!
//! ## Request flow
//! - A POST carrying a known `Mcp-Session-Id` is forwarded to that session's
//!   [`SessionChannel`]
//! - A POST carrying a well-formed `initialize` request creates a new
//!   session and returns its id in the `Mcp-Session-Id` response header
//! - Anything else is rejected with a JSON-RPC error envelope
//!
//! Responses are streamed as SSE when the client accepts
//! `text/event-stream`, so tool notifications reach the client before the
//! result; otherwise a plain JSON body is returned.

pub mod channel;
pub mod cors;
pub mod json_rpc_responses;
pub mod notification;
pub mod prelude;
pub mod protocol;
pub mod router;
pub mod server;
pub mod sse;
pub mod tool;

// Re-export main types
pub use channel::{InitializeOutcome, PendingSessionChannel, SessionChannel};
pub use cors::CorsLayer;
pub use json_rpc_responses::McpBody;
pub use notification::{NotificationError, NotificationSender, OutboundFrame};
pub use protocol::{
    MCP_SESSION_ID_HEADER, accepts_event_stream, extract_session_id, is_initialize_request,
};
pub use router::{BoxedSessionRegistry, SessionRouter};
pub use server::{
    HttpMcpServer, HttpMcpServerBuilder, MIN_SWEEP_INTERVAL, ServerConfig, ServerInfo, ServerStats,
};
pub use tool::{McpTool, ToolError, ToolRegistry, ToolRegistryFactory};

// Re-export foundational types
pub use session_router_protocol::*;
pub use session_router_registry::{
    EvictionPolicy, InMemorySessionRegistry, RegistryError, SessionRegistry,
};

/// Result type for HTTP MCP operations
pub type Result<T> = std::result::Result<T, HttpMcpError>;

/// HTTP MCP specific errors
#[derive(Debug, thiserror::Error)]
pub enum HttpMcpError {
    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),

    #[error("JSON-RPC error: {0}")]
    JsonRpc(#[from] session_router_json_rpc::JsonRpcError),

    #[error("MCP protocol error: {0}")]
    Mcp(#[from] session_router_protocol::McpError),

    #[error("Session registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Request task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}
