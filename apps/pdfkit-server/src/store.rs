//! In-memory, TTL-bounded session store.
//!
//! Session state is transient: it lives for one browsing interaction and is
//! dropped on explicit clear or on expiry. Expiry is enforced on access —
//! an expired entry is removed and the request is answered with a
//! session-expired failure, so no background sweeper is needed.
//!
//! Requests against the same session are serialized by the store lock;
//! between requests, last-write-wins on session fields is the documented
//! behavior.

use crate::error::ServerError;
use pdfkit_core::ToolkitSession;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;

pub struct SessionStore {
    entries: RwLock<HashMap<String, SessionEntry>>,
    ttl: Duration,
}

struct SessionEntry {
    session: ToolkitSession,
    last_seen: Instant,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Create a fresh session and return its id.
    pub async fn create(&self) -> String {
        let id = Uuid::new_v4().to_string();
        let mut entries = self.entries.write().await;
        entries.insert(
            id.clone(),
            SessionEntry {
                session: ToolkitSession::default(),
                last_seen: Instant::now(),
            },
        );
        id
    }

    /// Drop a session entirely; true if it existed.
    pub async fn remove(&self, id: &str) -> bool {
        self.entries.write().await.remove(id).is_some()
    }

    /// Run `op` against a session's state, refreshing its TTL.
    pub async fn with_session<T>(
        &self,
        id: &str,
        op: impl FnOnce(&mut ToolkitSession) -> Result<T, ServerError>,
    ) -> Result<T, ServerError> {
        let mut entries = self.entries.write().await;

        let expired = match entries.get(id) {
            None => return Err(ServerError::SessionNotFound(id.to_string())),
            Some(entry) => entry.last_seen.elapsed() > self.ttl,
        };
        if expired {
            entries.remove(id);
            return Err(ServerError::SessionExpired);
        }

        let entry = entries
            .get_mut(id)
            .ok_or_else(|| ServerError::SessionNotFound(id.to_string()))?;
        entry.last_seen = Instant::now();
        op(&mut entry.session)
    }

    /// Number of stored sessions, expired-but-unvisited entries included.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}
