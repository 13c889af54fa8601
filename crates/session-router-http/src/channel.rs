//! Per-session channel
//!
//! A [`PendingSessionChannel`] is built for every accepted initialize request
//! and becomes a [`SessionChannel`] only once it has been published in the
//! registry under its final id. All later traffic for the session runs
//! through [`SessionChannel::handle_request`], serialized by a per-session
//! lock so that two overlapping POSTs never interleave their frames.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use session_router_json_rpc::{
    JsonRpcError, JsonRpcMessage, JsonRpcNotification, JsonRpcReply, JsonRpcRequest,
    JsonRpcResponse,
};
use session_router_protocol::{
    CallToolParams, CallToolResult, EmptyResult, InitializeRequest, InitializeResult,
    ListToolsResult, LoggingLevel, McpError, ServerCapabilities, SetLevelParams, methods,
};
use session_router_registry::{RegistryError, SessionRegistry, new_session_id};

use crate::notification::{NotificationSender, OutboundFrame};
use crate::server::ServerInfo;
use crate::tool::{ToolError, ToolRegistry};

/// Mutable per-session state, only touched while the session lock is held
#[derive(Debug, Default)]
struct ChannelState {
    log_level: Option<LoggingLevel>,
    client_initialized: bool,
}

struct ChannelInner {
    session_id: String,
    tools: ToolRegistry,
    server_info: Arc<ServerInfo>,
    state: Mutex<ChannelState>,
}

/// A live session. Clones share the same underlying state.
#[derive(Clone)]
pub struct SessionChannel {
    inner: Arc<ChannelInner>,
}

impl std::fmt::Debug for SessionChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionChannel")
            .field("session_id", &self.inner.session_id)
            .field("tools", &self.inner.tools)
            .finish_non_exhaustive()
    }
}

/// A channel that has not been published yet
pub struct PendingSessionChannel {
    tools: ToolRegistry,
    server_info: Arc<ServerInfo>,
}

/// Result of a well-formed initialize attempt
#[derive(Debug)]
pub enum InitializeOutcome {
    /// The session is registered and ready
    Established {
        session_id: String,
        channel: SessionChannel,
        response: JsonRpcResponse,
    },
    /// The request was not a valid initialize; nothing was registered
    Rejected(JsonRpcError),
}

impl PendingSessionChannel {
    pub fn new(tools: ToolRegistry, server_info: Arc<ServerInfo>) -> Self {
        Self { tools, server_info }
    }

    /// Validate the handshake, settle the session id, publish the channel
    /// and build the handshake response.
    ///
    /// A non-empty `requested_session_id` is reused as-is; otherwise a fresh
    /// id is generated. The channel is in the registry before this returns,
    /// so the client can use the id as soon as it sees the response.
    pub async fn initialize<R>(
        self,
        request: &JsonRpcRequest,
        requested_session_id: Option<String>,
        registry: &R,
    ) -> Result<InitializeOutcome, RegistryError>
    where
        R: SessionRegistry<SessionChannel> + ?Sized,
    {
        let params: InitializeRequest = match request.parse_params() {
            Ok(params) => params,
            Err(err) => {
                debug!("Rejecting initialize with invalid params: {}", err);
                return Ok(InitializeOutcome::Rejected(JsonRpcError::invalid_params(
                    request.id.clone(),
                    &format!("Invalid initialize params: {}", err),
                )));
            }
        };

        let version = params.negotiated_version();
        let mut result = InitializeResult::new(
            version,
            ServerCapabilities::logging_and_tools(),
            self.server_info.implementation(),
        );
        if let Some(instructions) = &self.server_info.instructions {
            result = result.with_instructions(instructions.clone());
        }
        let result = match serde_json::to_value(&result) {
            Ok(value) => value,
            Err(err) => {
                return Ok(InitializeOutcome::Rejected(
                    McpError::from(err).to_json_rpc_error(Some(request.id.clone())),
                ));
            }
        };

        let session_id = requested_session_id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(new_session_id);

        let channel = SessionChannel {
            inner: Arc::new(ChannelInner {
                session_id: session_id.clone(),
                tools: self.tools,
                server_info: self.server_info,
                state: Mutex::new(ChannelState::default()),
            }),
        };

        registry.register(session_id.clone(), channel.clone()).await?;

        info!(
            "Session {} initialized by {} {} (protocol {})",
            session_id, params.client_info.name, params.client_info.version, version
        );

        Ok(InitializeOutcome::Established {
            session_id,
            channel,
            response: JsonRpcResponse::success(request.id.clone(), result),
        })
    }
}

impl SessionChannel {
    pub fn session_id(&self) -> &str {
        &self.inner.session_id
    }

    pub fn server_info(&self) -> &ServerInfo {
        &self.inner.server_info
    }

    /// Whether the client has sent `notifications/initialized`
    pub async fn is_client_initialized(&self) -> bool {
        self.inner.state.lock().await.client_initialized
    }

    /// Process every message of one POST body in order.
    ///
    /// Replies and handler notifications are written to `sink` in the order
    /// they are produced. The session lock is held until the last reply has
    /// been queued.
    pub async fn handle_request(
        &self,
        messages: Vec<Result<JsonRpcMessage, JsonRpcError>>,
        sink: UnboundedSender<OutboundFrame>,
    ) {
        let mut state = self.inner.state.lock().await;

        for message in messages {
            match message {
                Ok(JsonRpcMessage::Request(request)) => {
                    let reply = self.handle_call(request, &mut state, &sink).await;
                    self.emit(&sink, OutboundFrame::Reply(reply));
                }
                Ok(JsonRpcMessage::Notification(notification)) => {
                    self.handle_notification(notification, &mut state);
                }
                Ok(JsonRpcMessage::Response(_)) => {
                    debug!(
                        "Ignoring client response on session {}",
                        self.inner.session_id
                    );
                }
                Err(error) => self.emit(&sink, OutboundFrame::Reply(error.into())),
            }
        }
    }

    fn emit(&self, sink: &UnboundedSender<OutboundFrame>, frame: OutboundFrame) {
        if sink.send(frame).is_err() {
            debug!(
                "Response stream for session {} closed, dropping frame",
                self.inner.session_id
            );
        }
    }

    fn handle_notification(&self, notification: JsonRpcNotification, state: &mut ChannelState) {
        match notification.method.as_str() {
            methods::NOTIFICATION_INITIALIZED => {
                state.client_initialized = true;
                debug!("Client initialized on session {}", self.inner.session_id);
            }
            other => debug!(
                "Accepted notification {} on session {}",
                other, self.inner.session_id
            ),
        }
    }

    async fn handle_call(
        &self,
        request: JsonRpcRequest,
        state: &mut ChannelState,
        sink: &UnboundedSender<OutboundFrame>,
    ) -> JsonRpcReply {
        debug!(
            "Session {} handling {} (id {})",
            self.inner.session_id, request.method, request.id
        );

        let method = request.method.clone();
        match method.as_str() {
            methods::INITIALIZE => McpError::AlreadyInitialized
                .to_json_rpc_error(Some(request.id))
                .into(),
            methods::PING => success(&request, &EmptyResult::default()),
            methods::TOOLS_LIST => success(
                &request,
                &ListToolsResult {
                    tools: self.inner.tools.list(),
                },
            ),
            methods::LOGGING_SET_LEVEL => match request.parse_params::<SetLevelParams>() {
                Ok(params) => {
                    state.log_level = Some(params.level);
                    debug!(
                        "Session {} log level set to {:?}",
                        self.inner.session_id, params.level
                    );
                    success(&request, &EmptyResult::default())
                }
                Err(err) => McpError::invalid_params(err.to_string())
                    .to_json_rpc_error(Some(request.id))
                    .into(),
            },
            methods::TOOLS_CALL => self.call_tool(request, state, sink).await,
            other => JsonRpcError::method_not_found(request.id.clone(), other).into(),
        }
    }

    async fn call_tool(
        &self,
        request: JsonRpcRequest,
        state: &ChannelState,
        sink: &UnboundedSender<OutboundFrame>,
    ) -> JsonRpcReply {
        let params: CallToolParams = match request.parse_params() {
            Ok(params) => params,
            Err(err) => {
                return McpError::invalid_params(err.to_string())
                    .to_json_rpc_error(Some(request.id))
                    .into();
            }
        };

        let Some(tool) = self.inner.tools.get(&params.name) else {
            return McpError::ToolNotFound(params.name)
                .to_json_rpc_error(Some(request.id))
                .into();
        };

        let args = Value::Object(params.arguments.unwrap_or_else(Map::new));
        let notifier =
            NotificationSender::new(self.inner.session_id.clone(), sink.clone(), state.log_level);

        match tool.call(args, notifier).await {
            Ok(result) => success(&request, &result),
            Err(ToolError::InvalidArguments(message)) => McpError::invalid_params(message)
                .to_json_rpc_error(Some(request.id))
                .into(),
            Err(ToolError::Execution(message)) => {
                warn!(
                    "Tool {} failed on session {}: {}",
                    params.name, self.inner.session_id, message
                );
                success(&request, &CallToolResult::error(message))
            }
        }
    }
}

fn success<T: Serialize>(request: &JsonRpcRequest, result: &T) -> JsonRpcReply {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(request.id.clone(), value).into(),
        Err(err) => McpError::from(err)
            .to_json_rpc_error(Some(request.id.clone()))
            .into(),
    }
}
