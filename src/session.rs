//! Per-client session identity.
//!
//! The engine keys its cookie jar and connection pool by `sessionId`. One id
//! is generated per client and sent with every request from that client, so
//! consecutive calls reuse the same engine-side state.

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

/// Stable session identifier. Cheap to clone; never changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Session {
    id: Arc<str>,
}

impl Session {
    /// Create a session with a random UUIDv4 id.
    pub fn new() -> Self {
        Self::from_id(Uuid::new_v4().to_string())
    }

    /// Resume a session under a caller-chosen id.
    pub fn from_id(id: impl Into<String>) -> Self {
        let id: String = id.into();
        Self { id: Arc::from(id) }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_uuids_and_distinct() {
        let a = Session::new();
        let b = Session::new();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(a.id()).is_ok());
    }

    #[test]
    fn test_clone_shares_id() {
        let session = Session::from_id("fixed");
        let clone = session.clone();
        assert_eq!(clone.id(), "fixed");
        assert_eq!(clone, session);
    }
}
