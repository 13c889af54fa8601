//! HTTP MCP server with an injectable session registry
//!
//! The server owns the accept loop and the idle-session sweeper; request
//! handling itself lives in [`SessionRouter`].

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use session_router_protocol::Implementation;
use session_router_registry::{EvictionPolicy, InMemorySessionRegistry};

use crate::Result;
use crate::channel::SessionChannel;
use crate::router::{BoxedSessionRegistry, SessionRouter};
use crate::tool::{ToolRegistry, ToolRegistryFactory};

/// Shortest period the idle-session sweeper runs at
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Configuration for the HTTP MCP server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_address: SocketAddr,
    /// Path for MCP endpoint
    pub mcp_path: String,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum request body size
    pub max_body_size: usize,
    /// Always answer with `application/json`, even when the client accepts SSE.
    /// Notifications emitted during a request are dropped in this mode.
    pub json_response: bool,
    /// When idle sessions are evicted
    pub eviction_policy: EvictionPolicy,
    /// How often the sweeper looks for idle sessions, never faster than
    /// [`MIN_SWEEP_INTERVAL`]
    pub sweep_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 3000)),
            mcp_path: "/mcp".to_string(),
            enable_cors: true,
            max_body_size: 1024 * 1024, // 1MB
            json_response: false,
            eviction_policy: EvictionPolicy::default(),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

/// Identity reported to clients in the initialize handshake
#[derive(Debug, Clone, PartialEq)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
    pub instructions: Option<String>,
}

impl ServerInfo {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            instructions: None,
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    pub fn implementation(&self) -> Implementation {
        Implementation::new(&self.name, &self.version)
    }
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }
}

/// Builder for HTTP MCP server with pluggable registry
pub struct HttpMcpServerBuilder {
    config: ServerConfig,
    server_info: ServerInfo,
    tools: ToolRegistryFactory,
    registry: Option<Arc<BoxedSessionRegistry>>,
}

impl HttpMcpServerBuilder {
    /// Create a new builder with an in-memory registry and no tools
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            server_info: ServerInfo::default(),
            tools: Arc::new(ToolRegistry::new),
            registry: None,
        }
    }

    /// Create a new builder around an existing registry
    pub fn with_registry(registry: Arc<BoxedSessionRegistry>) -> Self {
        Self {
            registry: Some(registry),
            ..Self::new()
        }
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the bind address
    pub fn bind_address(mut self, addr: SocketAddr) -> Self {
        self.config.bind_address = addr;
        self
    }

    /// Set the MCP endpoint path
    pub fn mcp_path(mut self, path: impl Into<String>) -> Self {
        self.config.mcp_path = path.into();
        self
    }

    /// Enable or disable CORS
    pub fn cors(mut self, enable: bool) -> Self {
        self.config.enable_cors = enable;
        self
    }

    /// Set maximum request body size
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.config.max_body_size = size;
        self
    }

    /// Answer with plain JSON even when the client accepts SSE
    pub fn json_response(mut self, enable: bool) -> Self {
        self.config.json_response = enable;
        self
    }

    pub fn eviction_policy(mut self, policy: EvictionPolicy) -> Self {
        self.config.eviction_policy = policy;
        self
    }

    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.config.sweep_interval = interval;
        self
    }

    /// Set the name and version reported in the handshake
    pub fn server_info(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        let instructions = self.server_info.instructions.take();
        self.server_info = ServerInfo {
            instructions,
            ..ServerInfo::new(name, version)
        };
        self
    }

    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.server_info.instructions = Some(instructions.into());
        self
    }

    /// Set the factory that builds each new session's tool set
    pub fn tools<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> ToolRegistry + Send + Sync + 'static,
    {
        self.tools = Arc::new(factory);
        self
    }

    /// Build the HTTP MCP server
    pub fn build(self) -> HttpMcpServer {
        let registry = self.registry.unwrap_or_else(|| {
            Arc::new(InMemorySessionRegistry::<SessionChannel>::new()) as Arc<BoxedSessionRegistry>
        });
        let config = Arc::new(self.config);
        let router = SessionRouter::new(
            Arc::clone(&config),
            Arc::clone(&registry),
            self.tools,
            Arc::new(self.server_info),
        );

        HttpMcpServer {
            config,
            registry,
            router,
        }
    }
}

impl Default for HttpMcpServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// HTTP MCP Server
#[derive(Clone)]
pub struct HttpMcpServer {
    config: Arc<ServerConfig>,
    registry: Arc<BoxedSessionRegistry>,
    router: SessionRouter,
}

impl HttpMcpServer {
    pub fn builder() -> HttpMcpServerBuilder {
        HttpMcpServerBuilder::new()
    }

    pub fn builder_with_registry(registry: Arc<BoxedSessionRegistry>) -> HttpMcpServerBuilder {
        HttpMcpServerBuilder::with_registry(registry)
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// The request router, for embedding in another hyper service
    pub fn router(&self) -> SessionRouter {
        self.router.clone()
    }

    /// Bind the configured address
    pub async fn bind(&self) -> Result<TcpListener> {
        let listener = TcpListener::bind(self.config.bind_address).await?;
        Ok(listener)
    }

    /// Bind and serve until the process is stopped
    pub async fn run(&self) -> Result<()> {
        let listener = self.bind().await?;
        self.serve_with_shutdown(listener, std::future::pending())
            .await
    }

    /// Serve connections from `listener` until `shutdown` resolves.
    ///
    /// Connections already accepted keep running to completion.
    pub async fn serve_with_shutdown<F>(&self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let local_addr = listener.local_addr()?;
        info!("HTTP MCP server listening on {}", local_addr);
        info!("MCP endpoint available at: {}", self.config.mcp_path);
        info!(
            "Session registry: {} (eviction: {})",
            self.registry.backend_name(),
            self.config.eviction_policy
        );

        let sweeper = self.start_session_sweeper();
        let result = self.accept_loop(listener, shutdown).await;
        if let Some(handle) = sweeper {
            handle.abort();
        }
        result
    }

    async fn accept_loop<F>(&self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            let (stream, peer_addr) = tokio::select! {
                accepted = listener.accept() => accepted?,
                _ = &mut shutdown => {
                    info!("Shutdown signal received, no longer accepting connections");
                    return Ok(());
                }
            };
            debug!("New connection from {}", peer_addr);

            let router = self.router.clone();
            tokio::spawn(async move {
                let io = TokioIo::new(stream);
                let service = service_fn(move |req| {
                    let router = router.clone();
                    async move { Ok::<_, Infallible>(router.handle(req).await) }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    // Filter out common client disconnection errors that aren't actual problems
                    let err_str = err.to_string();
                    if err_str.contains("connection closed before message completed") {
                        debug!("Client disconnected (normal): {}", err);
                    } else {
                        error!("Error serving connection: {}", err);
                    }
                }
            });
        }
    }

    /// Start the background idle-session sweeper, unless eviction is off
    fn start_session_sweeper(&self) -> Option<JoinHandle<()>> {
        self.config.eviction_policy.idle_timeout()?;

        let server = self.clone();
        let period = self.config.sweep_interval.max(MIN_SWEEP_INTERVAL);
        if period != self.config.sweep_interval {
            warn!(
                "Sweep interval {:?} is below the minimum, using {:?}",
                self.config.sweep_interval, period
            );
        }
        Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                server.sweep_idle_sessions().await;
            }
        }))
    }

    /// Evict every session idle for longer than the configured timeout,
    /// returning the evicted ids
    pub async fn sweep_idle_sessions(&self) -> Vec<String> {
        let Some(timeout) = self.config.eviction_policy.idle_timeout() else {
            return Vec::new();
        };
        // Nothing can have been idle longer than the clock has been running
        let Some(cutoff) = Instant::now().checked_sub(timeout) else {
            return Vec::new();
        };

        let expired = self.registry.expire_idle(cutoff).await;
        if !expired.is_empty() {
            info!("Evicted {} idle sessions", expired.len());
            for session_id in &expired {
                debug!("Evicted session: {}", session_id);
            }
        }
        expired
    }

    /// Close a session explicitly. Returns whether it existed.
    pub async fn close_session(&self, session_id: &str) -> bool {
        let closed = self.registry.remove(session_id).await.is_some();
        if closed {
            info!("Closed session {}", session_id);
        } else {
            debug!("close_session: no session {}", session_id);
        }
        closed
    }

    /// Get server statistics
    pub async fn stats(&self) -> ServerStats {
        ServerStats {
            session_count: self.registry.session_count().await,
            registry_backend: self.registry.backend_name().to_string(),
        }
    }
}

/// Server statistics
#[derive(Debug, Clone)]
pub struct ServerStats {
    pub session_count: usize,
    pub registry_backend: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    use session_router_json_rpc::{JsonRpcRequest, RequestId};
    use session_router_registry::SessionRegistry;
    use serde_json::json;

    use crate::channel::{InitializeOutcome, PendingSessionChannel};

    async fn open_session(server: &HttpMcpServer) -> String {
        let request = JsonRpcRequest::with_params(
            RequestId::Number(1),
            "initialize",
            &json!({
                "protocolVersion": "2025-06-18",
                "capabilities": {},
                "clientInfo": {"name": "test-client", "version": "1.0"}
            }),
        )
        .unwrap();

        let pending = PendingSessionChannel::new(ToolRegistry::new(), Arc::new(ServerInfo::default()));
        match pending
            .initialize(&request, None, server.registry.as_ref())
            .await
            .unwrap()
        {
            InitializeOutcome::Established { session_id, .. } => session_id,
            InitializeOutcome::Rejected(err) => panic!("initialize rejected: {}", err),
        }
    }

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_address.to_string(), "127.0.0.1:3000");
        assert_eq!(config.mcp_path, "/mcp");
        assert!(config.enable_cors);
        assert!(!config.json_response);
        assert_eq!(config.max_body_size, 1024 * 1024);
        assert_eq!(
            config.eviction_policy,
            EvictionPolicy::IdleTimeout(Duration::from_secs(30 * 60))
        );
    }

    #[test]
    fn test_builder() {
        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)), 3000);
        let server = HttpMcpServer::builder()
            .bind_address(addr)
            .mcp_path("/api/mcp")
            .cors(false)
            .max_body_size(2048)
            .json_response(true)
            .eviction_policy(EvictionPolicy::Never)
            .instructions("be nice")
            .server_info("builder-test", "9.9.9")
            .build();

        assert_eq!(server.config().bind_address, addr);
        assert_eq!(server.config().mcp_path, "/api/mcp");
        assert!(!server.config().enable_cors);
        assert!(server.config().json_response);
        assert_eq!(server.config().max_body_size, 2048);
        assert_eq!(server.config().eviction_policy, EvictionPolicy::Never);
        assert_eq!(
            server.router().server_info(),
            &ServerInfo::new("builder-test", "9.9.9").with_instructions("be nice")
        );
    }

    #[tokio::test]
    async fn test_server_stats_and_close_session() {
        let server = HttpMcpServer::builder().build();

        let stats = server.stats().await;
        assert_eq!(stats.session_count, 0);
        assert_eq!(stats.registry_backend, "InMemory");

        let session_id = open_session(&server).await;
        assert_eq!(server.stats().await.session_count, 1);

        assert!(server.close_session(&session_id).await);
        assert!(!server.close_session(&session_id).await);
        assert_eq!(server.stats().await.session_count, 0);
    }

    #[tokio::test]
    async fn test_injected_registry_is_shared() {
        let registry = Arc::new(InMemorySessionRegistry::<SessionChannel>::new());
        let server = HttpMcpServer::builder_with_registry(registry.clone()).build();

        let session_id = open_session(&server).await;

        assert!(registry.session_info(&session_id).await.is_some());
        assert_eq!(server.stats().await.session_count, 1);
        assert!(server.close_session(&session_id).await);
        assert_eq!(registry.session_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_evicts_only_idle_sessions() {
        let server = HttpMcpServer::builder()
            .eviction_policy(EvictionPolicy::IdleTimeout(Duration::from_secs(10)))
            .build();

        // Let the clock run past the timeout so a cutoff exists
        tokio::time::advance(Duration::from_secs(20)).await;

        let stale = open_session(&server).await;
        tokio::time::advance(Duration::from_secs(8)).await;
        let fresh = open_session(&server).await;
        tokio::time::advance(Duration::from_secs(5)).await;

        let evicted = server.sweep_idle_sessions().await;
        assert_eq!(evicted, vec![stale]);
        assert_eq!(server.registry.session_ids().await, vec![fresh]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_is_noop_when_eviction_disabled() {
        let server = HttpMcpServer::builder()
            .eviction_policy(EvictionPolicy::Never)
            .build();
        open_session(&server).await;

        tokio::time::advance(Duration::from_secs(365 * 24 * 3600)).await;
        assert!(server.sweep_idle_sessions().await.is_empty());
        assert!(server.start_session_sweeper().is_none());
        assert_eq!(server.stats().await.session_count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_sweep_interval_keeps_sweeper_alive() {
        let server = HttpMcpServer::builder()
            .eviction_policy(EvictionPolicy::IdleTimeout(Duration::from_secs(10)))
            .sweep_interval(Duration::ZERO)
            .build();
        tokio::time::advance(Duration::from_secs(20)).await;
        open_session(&server).await;

        let sweeper = server.start_session_sweeper().unwrap();
        tokio::time::sleep(Duration::from_secs(15)).await;

        assert!(!sweeper.is_finished());
        assert_eq!(server.stats().await.session_count, 0);
        sweeper.abort();
    }

    #[tokio::test]
    async fn test_serve_with_shutdown_returns_on_signal() {
        let server = HttpMcpServer::builder()
            .bind_address(SocketAddr::from(([127, 0, 0, 1], 0)))
            .build();
        let listener = server.bind().await.unwrap();

        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let handle = tokio::spawn({
            let server = server.clone();
            async move {
                server
                    .serve_with_shutdown(listener, async {
                        let _ = rx.await;
                    })
                    .await
            }
        });

        tx.send(()).unwrap();
        handle.await.unwrap().unwrap();
    }
}
