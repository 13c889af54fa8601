//! HTTP response builders
//!
//! Every builder here is infallible: bodies are serialized from types that
//! cannot fail to encode, and headers are static or validated before use.

use bytes::Bytes;
use http_body_util::{BodyExt, Empty, Full, combinators::UnsyncBoxBody};
use hyper::header::{ALLOW, CONTENT_TYPE, HeaderValue};
use hyper::{Response, StatusCode};
use serde::Serialize;
use tracing::warn;

use session_router_json_rpc::JsonRpcError;

use crate::protocol::MCP_SESSION_ID_HEADER;

/// Body type shared by JSON and SSE responses
pub type McpBody = UnsyncBoxBody<Bytes, hyper::Error>;

pub fn full_body(bytes: impl Into<Bytes>) -> McpBody {
    Full::new(bytes.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

pub fn empty_body() -> McpBody {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed_unsync()
}

fn text_response(status: StatusCode, text: &'static str) -> Response<McpBody> {
    let mut response = Response::new(full_body(text));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    response
}

/// Serialize `payload` as an `application/json` response
pub fn json_rpc_response<T: Serialize>(status: StatusCode, payload: &T) -> Response<McpBody> {
    let body = serde_json::to_vec(payload).unwrap_or_else(|err| {
        warn!("Failed to serialize JSON response: {}", err);
        Vec::new()
    });
    let mut response = Response::new(full_body(body));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

/// A JSON-RPC error envelope with the given HTTP status
pub fn error_envelope_response(status: StatusCode, error: JsonRpcError) -> Response<McpBody> {
    json_rpc_response(status, &error)
}

/// 400 for a body that is not JSON
pub fn parse_error_response() -> Response<McpBody> {
    error_envelope_response(StatusCode::BAD_REQUEST, JsonRpcError::parse_error())
}

/// 400 for a request with neither a known session nor a valid initialize
pub fn bad_request_response() -> Response<McpBody> {
    error_envelope_response(
        StatusCode::BAD_REQUEST,
        JsonRpcError::server_error(None, -32000, "Bad Request: No valid session ID provided"),
    )
}

/// 409 for an initialize that asked for a session id already in use
pub fn conflict_response() -> Response<McpBody> {
    error_envelope_response(
        StatusCode::CONFLICT,
        JsonRpcError::server_error(None, -32000, "Conflict: Session ID already in use"),
    )
}

pub fn internal_error_response() -> Response<McpBody> {
    error_envelope_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        JsonRpcError::internal_error(None, Some("Internal server error".to_string())),
    )
}

/// 413 for a body above the configured limit
pub fn payload_too_large_response() -> Response<McpBody> {
    error_envelope_response(
        StatusCode::PAYLOAD_TOO_LARGE,
        JsonRpcError::server_error(None, -32000, "Payload Too Large"),
    )
}

/// 405 with `Allow: POST`
pub fn method_not_allowed_response() -> Response<McpBody> {
    let mut response = text_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
    response
        .headers_mut()
        .insert(ALLOW, HeaderValue::from_static("POST"));
    response
}

pub fn not_found_response() -> Response<McpBody> {
    text_response(StatusCode::NOT_FOUND, "Not Found")
}

/// 202 for a body that held only notifications or client replies
pub fn accepted_response() -> Response<McpBody> {
    let mut response = Response::new(empty_body());
    *response.status_mut() = StatusCode::ACCEPTED;
    response
}

/// 204 answer to a CORS preflight
pub fn preflight_response() -> Response<McpBody> {
    let mut response = Response::new(empty_body());
    *response.status_mut() = StatusCode::NO_CONTENT;
    response
}

/// Attach the session id header. Ids that are not valid header values are
/// left off with a warning.
pub fn with_session_header(mut response: Response<McpBody>, session_id: &str) -> Response<McpBody> {
    match HeaderValue::from_str(session_id) {
        Ok(value) => {
            response.headers_mut().insert(MCP_SESSION_ID_HEADER, value);
        }
        Err(_) => warn!("Session id {:?} is not a valid header value", session_id),
    }
    response
}
