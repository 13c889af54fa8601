//! Greeting Server
//!
//! Streamable HTTP MCP server exposing `greet` and `multi-greet`.
//!
//! Usage:
//! ```bash
//! # Default (127.0.0.1:3000, SSE responses when the client accepts them)
//! cargo run --package greeting-server
//!
//! # JSON-only responses, sessions never evicted
//! cargo run --package greeting-server -- --json-response --session-idle-timeout-secs 0
//! ```

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use session_router_http::{EvictionPolicy, ServerConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use greeting_server::greeting_server;

/// Command-line arguments for the greeting server
#[derive(Parser, Debug)]
#[command(name = "greeting-server")]
#[command(about = "Streamable HTTP MCP server with greet and multi-greet tools")]
struct Args {
    /// Address to listen on
    #[arg(long, env = "MCP_BIND", default_value = "127.0.0.1:3000")]
    bind: SocketAddr,

    /// Path of the MCP endpoint
    #[arg(long, env = "MCP_PATH", default_value = "/mcp")]
    path: String,

    /// Always answer with application/json, dropping tool notifications
    #[arg(long, env = "MCP_JSON_RESPONSE")]
    json_response: bool,

    /// Evict sessions idle for this many seconds (0 disables eviction)
    #[arg(long, env = "MCP_SESSION_IDLE_TIMEOUT_SECS", default_value_t = 1800)]
    session_idle_timeout_secs: u64,

    /// Delay between multi-greet notifications, in milliseconds
    #[arg(long, env = "MCP_GREETING_DELAY_MS", default_value_t = 1000)]
    greeting_delay_ms: u64,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG takes precedence over --log-level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .context("invalid log filter")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = ServerConfig {
        bind_address: args.bind,
        mcp_path: args.path,
        json_response: args.json_response,
        eviction_policy: EvictionPolicy::from_idle_secs(args.session_idle_timeout_secs),
        ..ServerConfig::default()
    };
    let server = greeting_server(config, Duration::from_millis(args.greeting_delay_ms));

    let listener = server
        .bind()
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;

    info!("Starting greeting server");
    info!(
        "   JSON-only responses: {}",
        if args.json_response { "on" } else { "off" }
    );

    server
        .serve_with_shutdown(listener, async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl-C: {}", err);
                std::future::pending::<()>().await;
            }
        })
        .await?;

    info!("Server stopped");
    Ok(())
}
