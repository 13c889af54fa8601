//! MCP protocol versions and negotiation
//!
//! ## Version History
//! - **2024-11-05**: Initial MCP specification with HTTP+SSE transport
//! - **2025-03-26**: Introduced Streamable HTTP
//! - **2025-06-18**: Structured `_meta`, elicitation, tool output schemas

use serde::{Deserialize, Serialize};

/// Supported MCP protocol versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum McpVersion {
    #[serde(rename = "2024-11-05")]
    V2024_11_05,
    #[serde(rename = "2025-03-26")]
    V2025_03_26,
    #[serde(rename = "2025-06-18")]
    V2025_06_18,
}

impl McpVersion {
    /// The latest protocol version implemented by this crate
    pub const LATEST: McpVersion = McpVersion::V2025_06_18;

    pub const ALL: [McpVersion; 3] = [
        McpVersion::V2024_11_05,
        McpVersion::V2025_03_26,
        McpVersion::V2025_06_18,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_str() == s)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            McpVersion::V2024_11_05 => "2024-11-05",
            McpVersion::V2025_03_26 => "2025-03-26",
            McpVersion::V2025_06_18 => "2025-06-18",
        }
    }

    /// Pick the version to answer a client with: its own request when we
    /// support it, otherwise our latest and the client decides whether to
    /// continue.
    pub fn negotiate(requested: &str) -> Self {
        Self::parse(requested).unwrap_or(Self::LATEST)
    }
}

impl std::fmt::Display for McpVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for McpVersion {
    type Err = crate::McpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| crate::McpError::VersionMismatch {
            expected: Self::LATEST.as_str().to_string(),
            actual: s.to_string(),
        })
    }
}

impl Default for McpVersion {
    fn default() -> Self {
        Self::LATEST
    }
}
