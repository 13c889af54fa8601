//! Tool handlers invoked by `tools/call`
//!
//! Each session gets its own [`ToolRegistry`], built by a
//! [`ToolRegistryFactory`] when the session is initialized, so handler state
//! never crosses sessions.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use session_router_protocol::{CallToolResult, Tool, ToolSchema};

use crate::notification::NotificationSender;

/// Errors a tool handler may return
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Arguments did not match the tool's input schema. Sent back as JSON-RPC
    /// invalid params.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The tool ran and failed. Reported in-band as a `CallToolResult` with
    /// `isError: true`.
    #[error("{0}")]
    Execution(String),
}

impl ToolError {
    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::InvalidArguments(message.into())
    }

    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidArguments(err.to_string())
    }
}

/// A named operation callable through `tools/call`
#[async_trait]
pub trait McpTool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> Option<&str> {
        None
    }

    fn input_schema(&self) -> ToolSchema;

    /// Run the tool.
    ///
    /// `args` is always a JSON object (empty when the caller sent none).
    /// Notifications sent through `notifier` reach the client ahead of the
    /// returned result.
    async fn call(
        &self,
        args: Value,
        notifier: NotificationSender,
    ) -> Result<CallToolResult, ToolError>;

    /// Protocol description used by `tools/list`
    fn to_tool(&self) -> Tool {
        Tool {
            name: self.name().to_string(),
            description: self.description().map(String::from),
            input_schema: self.input_schema(),
        }
    }
}

/// The tool set bound to one session
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn McpTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool, replacing any tool with the same name
    pub fn register<T: McpTool + 'static>(&mut self, tool: T) {
        self.tools.insert(tool.name().to_string(), Arc::new(tool));
    }

    pub fn with_tool<T: McpTool + 'static>(mut self, tool: T) -> Self {
        self.register(tool);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn McpTool>> {
        self.tools.get(name).cloned()
    }

    /// Tool descriptions ordered by name
    pub fn list(&self) -> Vec<Tool> {
        let mut tools: Vec<Tool> = self.tools.values().map(|tool| tool.to_tool()).collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.tools.keys().collect();
        names.sort();
        f.debug_struct("ToolRegistry").field("tools", &names).finish()
    }
}

/// Builds a fresh tool set for each new session
pub type ToolRegistryFactory = Arc<dyn Fn() -> ToolRegistry + Send + Sync>;
