//! Server-Sent Events framing for POST responses
//!
//! Every frame is sent as an `event: message` event so that clients which
//! only listen for the default event type still see it.

use bytes::Bytes;
use http_body_util::{BodyExt, StreamBody};
use hyper::header::{CACHE_CONTROL, CONTENT_TYPE, HeaderValue};
use hyper::{Response, StatusCode, body::Frame};
use serde::Serialize;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, error};

use crate::json_rpc_responses::{McpBody, empty_body, full_body, with_session_header};
use crate::notification::OutboundFrame;

/// Format a payload as one SSE `message` event
pub fn format_sse_message<T: Serialize>(payload: &T) -> Result<Bytes, serde_json::Error> {
    let data = serde_json::to_string(payload)?;
    Ok(Bytes::from(format!("event: message\ndata: {}\n\n", data)))
}

/// Stream the frames of one request as a `text/event-stream` response.
///
/// The body ends once every sender of `frames` has been dropped, which
/// happens when the session has finished handling the request.
pub fn sse_response(frames: UnboundedReceiver<OutboundFrame>, session_id: &str) -> Response<McpBody> {
    let session = session_id.to_string();
    let stream = UnboundedReceiverStream::new(frames).filter_map(move |frame| {
        match format_sse_message(&frame) {
            Ok(bytes) => {
                debug!("Streaming SSE frame for session {}", session);
                Some(Ok::<_, hyper::Error>(Frame::data(bytes)))
            }
            Err(err) => {
                error!("Failed to serialize SSE frame for session {}: {}", session, err);
                None
            }
        }
    });

    event_stream_response(StreamBody::new(stream).boxed_unsync(), session_id)
}

/// Answer with a single SSE `message` event carrying `payload`
pub fn sse_single_response<T: Serialize>(payload: &T, session_id: &str) -> Response<McpBody> {
    let body = match format_sse_message(payload) {
        Ok(bytes) => full_body(bytes),
        Err(err) => {
            error!("Failed to serialize SSE frame for session {}: {}", session_id, err);
            empty_body()
        }
    };
    event_stream_response(body, session_id)
}

fn event_stream_response(body: McpBody, session_id: &str) -> Response<McpBody> {
    let mut response = Response::new(body);
    *response.status_mut() = StatusCode::OK;
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/event-stream"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert("X-Accel-Buffering", HeaderValue::from_static("no"));
    with_session_header(response, session_id)
}
