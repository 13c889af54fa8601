//! Header helpers and the initialize-request predicate

use hyper::HeaderMap;
use hyper::header::ACCEPT;
use serde_json::Value;

use session_router_json_rpc::{JSONRPC_VERSION, RequestId};
use session_router_protocol::{InitializeRequest, methods};

/// Header carrying the session id in both directions
pub const MCP_SESSION_ID_HEADER: &str = "Mcp-Session-Id";

/// Extract MCP session ID from HTTP request headers. Empty values count as
/// absent.
pub fn extract_session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(MCP_SESSION_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

/// Whether the client's `Accept` header admits an SSE response
pub fn accepts_event_stream(headers: &HeaderMap) -> bool {
    headers
        .get_all(ACCEPT)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .any(|accept| accept.contains("text/event-stream"))
}

/// True only for a single, well-formed `initialize` request: JSON-RPC 2.0,
/// a string or integer id, and params with a string `protocolVersion`, an
/// object `capabilities` and a `clientInfo` carrying string `name` and
/// `version`. Batches never qualify.
pub fn is_initialize_request(body: &Value) -> bool {
    let Some(obj) = body.as_object() else {
        return false;
    };

    obj.get("jsonrpc").and_then(Value::as_str) == Some(JSONRPC_VERSION)
        && obj
            .get("id")
            .is_some_and(|id| RequestId::from_value(id).is_some())
        && obj.get("method").and_then(Value::as_str) == Some(methods::INITIALIZE)
        && obj.get("params").is_some_and(|params| {
            params.get("capabilities").is_some_and(Value::is_object)
                && serde_json::from_value::<InitializeRequest>(params.clone()).is_ok()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::HeaderValue;
    use serde_json::json;

    fn initialize() -> Value {
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": {
                "protocolVersion": "2025-06-18",
                "capabilities": {},
                "clientInfo": {"name": "test-client", "version": "1.0"}
            }
        })
    }

    #[test]
    fn test_header_extraction() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_session_id(&headers), None);

        headers.insert("Mcp-Session-Id", HeaderValue::from_static("test-session-123"));
        assert_eq!(
            extract_session_id(&headers),
            Some("test-session-123".to_string())
        );

        headers.insert("mcp-session-id", HeaderValue::from_static(""));
        assert_eq!(extract_session_id(&headers), None);
    }

    #[test]
    fn test_accepts_event_stream() {
        let mut headers = HeaderMap::new();
        assert!(!accepts_event_stream(&headers));

        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/event-stream"),
        );
        assert!(accepts_event_stream(&headers));
    }

    #[test]
    fn test_initialize_predicate_accepts_valid_request() {
        assert!(is_initialize_request(&initialize()));

        let mut with_string_id = initialize();
        with_string_id["id"] = json!("init-1");
        assert!(is_initialize_request(&with_string_id));
    }

    #[test]
    fn test_initialize_predicate_rejects_near_misses() {
        let cases = [
            json!([initialize()]),
            json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"}),
            {
                let mut v = initialize();
                v["jsonrpc"] = json!("1.0");
                v
            },
            {
                let mut v = initialize();
                v.as_object_mut().unwrap().remove("id");
                v
            },
            {
                let mut v = initialize();
                v["id"] = json!(null);
                v
            },
            {
                let mut v = initialize();
                v["params"]["capabilities"] = json!(null);
                v
            },
            {
                let mut v = initialize();
                v["params"]["clientInfo"] = json!({"name": "test-client"});
                v
            },
            {
                let mut v = initialize();
                v["params"]["protocolVersion"] = json!(20250618);
                v
            },
            {
                let mut v = initialize();
                v.as_object_mut().unwrap().remove("params");
                v
            },
        ];

        for case in cases {
            assert!(!is_initialize_request(&case), "accepted {}", case);
        }
    }
}
