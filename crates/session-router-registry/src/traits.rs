//! Session Registry Trait
//!
//! The contract every registry backend honours: one atomic insert per
//! session id, lookups that refresh activity, and idle expiry driven by the
//! eviction policy.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::Instant;

use crate::RegistryResult;

/// Bookkeeping kept alongside each registered channel
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub session_id: String,
    /// Wall-clock creation time, for reporting
    pub created_at: DateTime<Utc>,
    /// Monotonic last-activity time, used for eviction
    #[serde(skip)]
    pub last_activity: Instant,
}

impl SessionInfo {
    pub fn new(session_id: String) -> Self {
        Self {
            session_id,
            created_at: Utc::now(),
            last_activity: Instant::now(),
        }
    }

    /// Update last activity timestamp
    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    /// True when the session has been idle since before `cutoff`
    pub fn is_idle_since(&self, cutoff: Instant) -> bool {
        self.last_activity < cutoff
    }
}

/// A process-wide map from session id to channel `C`.
///
/// Channels are cheap handles (`Clone`), so lookups hand out copies and
/// never hold the registry lock while a request runs.
#[async_trait]
pub trait SessionRegistry<C>: Send + Sync
where
    C: Clone + Send + Sync + 'static,
{
    /// Human-readable backend name, for logs
    fn backend_name(&self) -> &'static str;

    /// Resolve a session id, refreshing its last-activity time
    async fn lookup(&self, session_id: &str) -> Option<C>;

    /// Publish a channel under `session_id`.
    ///
    /// Fails with `DuplicateSession` if the id is already registered; the
    /// existing entry is left untouched.
    async fn register(&self, session_id: String, channel: C) -> RegistryResult<()>;

    /// Remove a session. Returns the channel if one was registered.
    async fn remove(&self, session_id: &str) -> Option<C>;

    async fn session_count(&self) -> usize;

    async fn session_ids(&self) -> Vec<String>;

    async fn session_info(&self, session_id: &str) -> Option<SessionInfo>;

    /// Drop every session whose last activity is older than `cutoff`,
    /// returning the removed ids
    async fn expire_idle(&self, cutoff: Instant) -> Vec<String>;
}
