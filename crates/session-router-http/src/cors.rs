//! CORS (Cross-Origin Resource Sharing) support

use hyper::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_EXPOSE_HEADERS, ACCESS_CONTROL_MAX_AGE, ACCESS_CONTROL_REQUEST_METHOD,
    HeaderValue,
};
use hyper::{HeaderMap, Method};

/// CORS layer for adding appropriate headers
pub struct CorsLayer;

impl CorsLayer {
    /// Apply CORS headers to a response. Browsers may read the session id
    /// header only because it is listed in the expose list.
    pub fn apply_cors_headers(headers: &mut HeaderMap) {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("POST, OPTIONS"),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(
                "Content-Type, Accept, Authorization, Mcp-Session-Id, MCP-Protocol-Version",
            ),
        );
        headers.insert(
            ACCESS_CONTROL_EXPOSE_HEADERS,
            HeaderValue::from_static(crate::protocol::MCP_SESSION_ID_HEADER),
        );
        headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static("86400"));
    }

    /// An `OPTIONS` request carrying `Access-Control-Request-Method`
    pub fn is_preflight(method: &Method, headers: &HeaderMap) -> bool {
        method == Method::OPTIONS && headers.contains_key(ACCESS_CONTROL_REQUEST_METHOD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_cors_headers() {
        let mut headers = HeaderMap::new();
        CorsLayer::apply_cors_headers(&mut headers);

        assert_eq!(headers.get("Access-Control-Allow-Origin").unwrap(), "*");
        assert_eq!(
            headers.get("Access-Control-Expose-Headers").unwrap(),
            "Mcp-Session-Id"
        );
        assert!(
            headers
                .get("Access-Control-Allow-Headers")
                .unwrap()
                .to_str()
                .unwrap()
                .contains("Mcp-Session-Id")
        );
        assert!(headers.contains_key("Access-Control-Max-Age"));
    }

    #[test]
    fn test_preflight_detection() {
        let mut headers = HeaderMap::new();
        assert!(!CorsLayer::is_preflight(&Method::OPTIONS, &headers));

        headers.insert(ACCESS_CONTROL_REQUEST_METHOD, HeaderValue::from_static("POST"));
        assert!(CorsLayer::is_preflight(&Method::OPTIONS, &headers));
        assert!(!CorsLayer::is_preflight(&Method::POST, &headers));
    }
}
