//! Greeting tools for the example server
//!
//! `greet` answers immediately. `multi-greet` sends log notifications
//! while it waits, so a streaming client sees progress before the result.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use session_router_http::{
    CallToolResult, HttpMcpServer, LoggingLevel, McpTool, NotificationSender, ServerConfig,
    ToolError, ToolRegistry, ToolSchema,
};
use tracing::{debug, info};

pub const SERVER_NAME: &str = "json-response-streamable-http-server";
pub const SERVER_VERSION: &str = "1.0.0";

/// Pause between multi-greet notifications unless configured otherwise
pub const DEFAULT_GREETING_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Deserialize)]
struct GreetArgs {
    name: String,
}

fn name_schema() -> ToolSchema {
    ToolSchema::object()
        .with_property(
            "name",
            json!({"type": "string", "description": "Name to greet"}),
        )
        .with_required(vec!["name".to_string()])
}

/// Returns "Hello, {name}!"
pub struct GreetTool;

#[async_trait]
impl McpTool for GreetTool {
    fn name(&self) -> &str {
        "greet"
    }

    fn description(&self) -> Option<&str> {
        Some("A simple greeting tool")
    }

    fn input_schema(&self) -> ToolSchema {
        name_schema()
    }

    async fn call(
        &self,
        args: Value,
        _notifier: NotificationSender,
    ) -> Result<CallToolResult, ToolError> {
        let args: GreetArgs = serde_json::from_value(args)?;
        Ok(CallToolResult::text(format!("Hello, {}!", args.name)))
    }
}

/// Greets twice with a delay, logging each step to the client
pub struct MultiGreetTool {
    delay: Duration,
}

impl MultiGreetTool {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for MultiGreetTool {
    fn default() -> Self {
        Self::new(DEFAULT_GREETING_DELAY)
    }
}

#[async_trait]
impl McpTool for MultiGreetTool {
    fn name(&self) -> &str {
        "multi-greet"
    }

    fn description(&self) -> Option<&str> {
        Some("A tool that sends different greetings with delays between them")
    }

    fn input_schema(&self) -> ToolSchema {
        name_schema()
    }

    async fn call(
        &self,
        args: Value,
        notifier: NotificationSender,
    ) -> Result<CallToolResult, ToolError> {
        let GreetArgs { name } = serde_json::from_value(args)?;
        debug!(
            "multi-greet for {} on session {}",
            name,
            notifier.session_id()
        );

        let log = |level: LoggingLevel, message: String| {
            notifier
                .send_log_message(level, message)
                .map_err(|e| ToolError::execution(e.to_string()))
        };

        log(LoggingLevel::Debug, format!("Starting multi-greet for {}", name))?;
        tokio::time::sleep(self.delay).await;

        log(LoggingLevel::Info, format!("Sending first greeting to {}", name))?;
        tokio::time::sleep(self.delay).await;

        log(LoggingLevel::Info, format!("Sending second greeting to {}", name))?;
        info!("multi-greet for {} complete", name);

        Ok(CallToolResult::text(format!("Good morning, {}!", name)))
    }
}

/// Tool set for one session
pub fn greeting_tools(delay: Duration) -> ToolRegistry {
    ToolRegistry::new()
        .with_tool(GreetTool)
        .with_tool(MultiGreetTool::new(delay))
}

/// Server preconfigured with the greeting tools and identity
pub fn greeting_server(config: ServerConfig, delay: Duration) -> HttpMcpServer {
    HttpMcpServer::builder()
        .config(config)
        .server_info(SERVER_NAME, SERVER_VERSION)
        .tools(move || greeting_tools(delay))
        .build()
}
