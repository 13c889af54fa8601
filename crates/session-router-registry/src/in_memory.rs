//! In-Memory Session Registry
//!
//! Stores every session in an `Arc<RwLock<HashMap>>`. Lookups only take the
//! read lock; each entry guards its own activity time. Sessions do not
//! survive a restart.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::{RegistryError, RegistryResult, SessionInfo, SessionRegistry};

/// Configuration for the in-memory registry
#[derive(Debug, Clone)]
pub struct InMemoryConfig {
    /// Maximum sessions to keep (for memory management)
    pub max_sessions: usize,
}

impl Default for InMemoryConfig {
    fn default() -> Self {
        Self {
            max_sessions: 100_000,
        }
    }
}

struct RegisteredSession<C> {
    channel: C,
    info: Mutex<SessionInfo>,
}

/// In-memory registry of session channels
pub struct InMemorySessionRegistry<C> {
    sessions: Arc<RwLock<HashMap<String, RegisteredSession<C>>>>,
    config: InMemoryConfig,
}

impl<C> Clone for InMemorySessionRegistry<C> {
    fn clone(&self) -> Self {
        Self {
            sessions: Arc::clone(&self.sessions),
            config: self.config.clone(),
        }
    }
}

impl<C> Default for InMemorySessionRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> std::fmt::Debug for InMemorySessionRegistry<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemorySessionRegistry")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<C> InMemorySessionRegistry<C> {
    pub fn new() -> Self {
        Self::with_config(InMemoryConfig::default())
    }

    pub fn with_config(config: InMemoryConfig) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            config,
        }
    }
}

#[async_trait]
impl<C> SessionRegistry<C> for InMemorySessionRegistry<C>
where
    C: Clone + Send + Sync + 'static,
{
    fn backend_name(&self) -> &'static str {
        "InMemory"
    }

    async fn lookup(&self, session_id: &str) -> Option<C> {
        let sessions = self.sessions.read().await;
        let entry = sessions.get(session_id)?;
        entry.info.lock().await.touch();
        Some(entry.channel.clone())
    }

    async fn register(&self, session_id: String, channel: C) -> RegistryResult<()> {
        let mut sessions = self.sessions.write().await;

        if sessions.len() >= self.config.max_sessions {
            return Err(RegistryError::MaxSessionsReached(self.config.max_sessions));
        }

        match sessions.entry(session_id) {
            Entry::Occupied(occupied) => {
                Err(RegistryError::DuplicateSession(occupied.key().clone()))
            }
            Entry::Vacant(vacant) => {
                let info = SessionInfo::new(vacant.key().clone());
                debug!("Registered session: {}", vacant.key());
                vacant.insert(RegisteredSession {
                    channel,
                    info: Mutex::new(info),
                });
                Ok(())
            }
        }
    }

    async fn remove(&self, session_id: &str) -> Option<C> {
        let mut sessions = self.sessions.write().await;
        let removed = sessions.remove(session_id).map(|entry| entry.channel);
        if removed.is_some() {
            debug!("Removed session: {}", session_id);
        }
        removed
    }

    async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    async fn session_ids(&self) -> Vec<String> {
        self.sessions.read().await.keys().cloned().collect()
    }

    async fn session_info(&self, session_id: &str) -> Option<SessionInfo> {
        let sessions = self.sessions.read().await;
        let entry = sessions.get(session_id)?;
        Some(entry.info.lock().await.clone())
    }

    async fn expire_idle(&self, cutoff: Instant) -> Vec<String> {
        let mut sessions = self.sessions.write().await;
        let expired: Vec<String> = sessions
            .iter_mut()
            .filter_map(|(id, entry)| {
                entry
                    .info
                    .get_mut()
                    .is_idle_since(cutoff)
                    .then(|| id.clone())
            })
            .collect();

        for id in &expired {
            sessions.remove(id);
        }

        if !expired.is_empty() {
            info!("Expired {} idle sessions", expired.len());
        }
        expired
    }
}
