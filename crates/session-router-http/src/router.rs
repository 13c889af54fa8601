//! Request router
//!
//! Decides, per HTTP request, whether the body belongs to an existing
//! session, opens a new one, or is rejected. This is the only place where
//! sessions are created.

use std::sync::Arc;

use bytes::Bytes;
use http_body::Body;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::{Method, Request, Response, StatusCode};
use serde_json::Value;
use tokio::sync::mpsc::unbounded_channel;
use tracing::{debug, error, info, warn};

use session_router_json_rpc::{JsonRpcBody, JsonRpcError, JsonRpcReply, JsonRpcRequest};
use session_router_registry::{RegistryError, SessionRegistry};

use crate::channel::{InitializeOutcome, PendingSessionChannel, SessionChannel};
use crate::cors::CorsLayer;
use crate::json_rpc_responses::*;
use crate::notification::OutboundFrame;
use crate::protocol::{accepts_event_stream, extract_session_id, is_initialize_request};
use crate::server::{ServerConfig, ServerInfo};
use crate::sse::{sse_response, sse_single_response};
use crate::tool::ToolRegistryFactory;
use crate::{HttpMcpError, Result};

/// Registry type used when the concrete backend is chosen at runtime
pub type BoxedSessionRegistry = dyn SessionRegistry<SessionChannel>;

/// Routes POST bodies on the MCP path to session channels
pub struct SessionRouter<R: ?Sized = BoxedSessionRegistry> {
    config: Arc<ServerConfig>,
    registry: Arc<R>,
    tools: ToolRegistryFactory,
    server_info: Arc<ServerInfo>,
}

impl<R: ?Sized> Clone for SessionRouter<R> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            registry: Arc::clone(&self.registry),
            tools: Arc::clone(&self.tools),
            server_info: Arc::clone(&self.server_info),
        }
    }
}

impl<R> SessionRouter<R>
where
    R: SessionRegistry<SessionChannel> + ?Sized + 'static,
{
    pub fn new(
        config: Arc<ServerConfig>,
        registry: Arc<R>,
        tools: ToolRegistryFactory,
        server_info: Arc<ServerInfo>,
    ) -> Self {
        Self {
            config,
            registry,
            tools,
            server_info,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<R> {
        &self.registry
    }

    pub fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }

    /// Handle one HTTP request. Never fails: every error becomes a response.
    pub async fn handle<B>(&self, req: Request<B>) -> Response<McpBody>
    where
        B: Body<Data = Bytes> + Send + 'static,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        debug!("Handling {} {}", method, path);

        let mut response = if path != self.config.mcp_path {
            not_found_response()
        } else if self.config.enable_cors && CorsLayer::is_preflight(&method, req.headers()) {
            preflight_response()
        } else if method != Method::POST {
            debug!("Rejecting {} on {}", method, path);
            method_not_allowed_response()
        } else {
            match self.handle_post(req).await {
                Ok(response) => response,
                Err(err) => {
                    error!("Request handling error: {}", err);
                    internal_error_response()
                }
            }
        };

        // Apply CORS if enabled
        if self.config.enable_cors {
            CorsLayer::apply_cors_headers(response.headers_mut());
        }
        response
    }

    async fn handle_post<B>(&self, req: Request<B>) -> Result<Response<McpBody>>
    where
        B: Body<Data = Bytes> + Send + 'static,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let (parts, body) = req.into_parts();

        let bytes = match Limited::new(body, self.config.max_body_size).collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(err) if err.downcast_ref::<LengthLimitError>().is_some() => {
                warn!(
                    "Request body exceeds limit of {} bytes",
                    self.config.max_body_size
                );
                return Ok(payload_too_large_response());
            }
            Err(err) => {
                warn!("Failed to read request body: {}", err);
                return Ok(error_envelope_response(
                    StatusCode::BAD_REQUEST,
                    JsonRpcError::server_error(None, -32000, "Bad Request: Failed to read body"),
                ));
            }
        };

        let stream = accepts_event_stream(&parts.headers) && !self.config.json_response;
        let requested_session_id = extract_session_id(&parts.headers);
        let value = serde_json::from_slice::<Value>(&bytes).ok();

        if let Some(session_id) = &requested_session_id {
            if let Some(channel) = self.registry.lookup(session_id).await {
                debug!("Routing request to session {}", session_id);
                return self.dispatch(channel, value, stream).await;
            }
            debug!("Session {} is not registered", session_id);
        }

        match value {
            Some(value) if is_initialize_request(&value) => {
                self.open_session(value, requested_session_id, stream).await
            }
            _ => {
                debug!("No valid session and no initialize request, rejecting");
                Ok(bad_request_response())
            }
        }
    }

    /// Existing-session path
    async fn dispatch(
        &self,
        channel: SessionChannel,
        value: Option<Value>,
        stream: bool,
    ) -> Result<Response<McpBody>> {
        let session_id = channel.session_id().to_string();

        let Some(value) = value else {
            debug!("Invalid JSON on session {}", session_id);
            return Ok(with_session_header(parse_error_response(), &session_id));
        };
        let body = match JsonRpcBody::from_value(value) {
            Ok(body) => body,
            Err(err) => {
                return Ok(with_session_header(
                    error_envelope_response(StatusCode::BAD_REQUEST, err),
                    &session_id,
                ));
            }
        };

        let (tx, mut rx) = unbounded_channel();

        if body.is_notification_only() {
            channel.handle_request(body.messages, tx).await;
            return Ok(with_session_header(accepted_response(), &session_id));
        }

        let is_batch = body.is_batch;
        // Runs on its own task so a client disconnect does not cancel the handler
        let worker = tokio::spawn(async move { channel.handle_request(body.messages, tx).await });

        if stream {
            let session = session_id.clone();
            tokio::spawn(async move {
                if let Err(err) = worker.await {
                    error!("Request task for session {} failed: {}", session, err);
                }
            });
            return Ok(sse_response(rx, &session_id));
        }

        worker.await?;

        let mut replies = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            match frame {
                OutboundFrame::Reply(reply) => replies.push(reply),
                OutboundFrame::Notification(notification) => debug!(
                    "Dropping {} for session {} (JSON response mode)",
                    notification.method, session_id
                ),
            }
        }

        let response = if is_batch {
            json_rpc_response(StatusCode::OK, &replies)
        } else {
            let reply = replies.into_iter().next().ok_or_else(|| {
                HttpMcpError::InvalidRequest("request produced no reply".to_string())
            })?;
            json_rpc_response(StatusCode::OK, &reply)
        };
        Ok(with_session_header(response, &session_id))
    }

    /// New-session path
    async fn open_session(
        &self,
        value: Value,
        requested_session_id: Option<String>,
        stream: bool,
    ) -> Result<Response<McpBody>> {
        let request: JsonRpcRequest = serde_json::from_value(value)?;
        let pending = PendingSessionChannel::new((self.tools)(), Arc::clone(&self.server_info));

        match pending
            .initialize(&request, requested_session_id, self.registry.as_ref())
            .await
        {
            Ok(InitializeOutcome::Established {
                session_id,
                response,
                ..
            }) => {
                let reply = JsonRpcReply::from(response);
                let http_response = if stream {
                    sse_single_response(&reply, &session_id)
                } else {
                    json_rpc_response(StatusCode::OK, &reply)
                };
                Ok(with_session_header(http_response, &session_id))
            }
            Ok(InitializeOutcome::Rejected(err)) => {
                debug!("Initialize rejected: {}", err);
                Ok(json_rpc_response(StatusCode::OK, &err))
            }
            Err(RegistryError::DuplicateSession(session_id)) => {
                info!("Initialize lost registration race for session {}", session_id);
                Ok(conflict_response())
            }
            Err(err) => Err(err.into()),
        }
    }
}
