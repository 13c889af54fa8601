//! # Protocol Prelude
//!
//! ```rust
//! use session_router_protocol::prelude::*;
//! ```

pub use crate::content::ContentBlock;
pub use crate::initialize::{
    ClientCapabilities, Implementation, InitializeRequest, InitializeResult, ServerCapabilities,
};
pub use crate::logging::{LoggingLevel, LoggingMessageNotification, SetLevelParams};
pub use crate::tools::{CallToolParams, CallToolResult, ListToolsResult, Tool, ToolSchema};
pub use crate::version::McpVersion;
pub use crate::{McpError, McpResult};
