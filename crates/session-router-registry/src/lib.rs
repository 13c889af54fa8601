//! # Session Registry
//!
//! Maps session identifiers to live session channels. The registry is
//! generic over the channel type so it can be exercised without an HTTP
//! stack, and is injected into the router rather than held in a global.
//!
//! ```rust
//! use session_router_registry::{InMemorySessionRegistry, SessionRegistry, new_session_id};
//!
//! # async fn demo() -> Result<(), session_router_registry::RegistryError> {
//! let registry: InMemorySessionRegistry<u32> = InMemorySessionRegistry::new();
//! let id = new_session_id();
//! registry.register(id.clone(), 7).await?;
//! assert_eq!(registry.lookup(&id).await, Some(7));
//! # Ok(())
//! # }
//! ```

mod eviction;
pub mod in_memory;
mod traits;

pub use eviction::EvictionPolicy;
pub use in_memory::{InMemoryConfig, InMemorySessionRegistry};
pub use traits::{SessionInfo, SessionRegistry};

use uuid::Uuid;

/// Errors raised by registry operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Session ID already in use: {0}")]
    DuplicateSession(String),
    #[error("Maximum sessions limit reached: {0}")]
    MaxSessionsReached(usize),
}

/// Convenience type alias for registry results
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Generate a fresh session identifier (random UUID v4).
///
/// The identifier is also the credential a client presents to resume a
/// session, so it must not be guessable or time-ordered.
pub fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}
