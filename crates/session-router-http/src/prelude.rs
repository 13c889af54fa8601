//! # Session Router HTTP Prelude
//!
//! ```rust
//! use session_router_http::prelude::*;
//! ```

// Core server types
pub use crate::cors::CorsLayer;
pub use crate::router::{BoxedSessionRegistry, SessionRouter};
pub use crate::server::{HttpMcpServer, HttpMcpServerBuilder, ServerConfig, ServerInfo, ServerStats};

// Sessions and tools
pub use crate::channel::{InitializeOutcome, PendingSessionChannel, SessionChannel};
pub use crate::notification::{NotificationError, NotificationSender};
pub use crate::tool::{McpTool, ToolError, ToolRegistry, ToolRegistryFactory};

// Re-export foundational types
pub use session_router_protocol::prelude::*;
pub use session_router_registry::{EvictionPolicy, InMemorySessionRegistry, SessionRegistry};

// Error types
pub use crate::{HttpMcpError, Result};
