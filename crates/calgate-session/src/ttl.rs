//! Idle-time tracking for session expiration.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

/// Tracks last access per session id.
///
/// Uses Tokio's clock so tests can drive expiry with a paused runtime.
#[derive(Debug)]
pub struct TtlTracker {
    last_seen: HashMap<String, Instant>,
    ttl: Option<Duration>,
}

impl TtlTracker {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            last_seen: HashMap::new(),
            ttl,
        }
    }

    /// Record an access, restarting the idle timer.
    pub fn touch(&mut self, session_id: &str) {
        self.last_seen.insert(session_id.to_string(), Instant::now());
    }

    /// Whether the session has been idle longer than the TTL.
    ///
    /// Untracked ids count as expired when a TTL is set.
    pub fn is_expired(&self, session_id: &str) -> bool {
        let Some(ttl) = self.ttl else {
            return false;
        };
        self.last_seen
            .get(session_id)
            .is_none_or(|seen| seen.elapsed() > ttl)
    }

    pub fn remove(&mut self, session_id: &str) {
        self.last_seen.remove(session_id);
    }

    /// Stop tracking every expired id and return them.
    pub fn drain_expired(&mut self) -> Vec<String> {
        let Some(ttl) = self.ttl else {
            return Vec::new();
        };
        let now = Instant::now();
        let expired: Vec<String> = self
            .last_seen
            .iter()
            .filter(|(_, seen)| now.duration_since(**seen) > ttl)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &expired {
            self.last_seen.remove(id);
        }
        expired
    }

    pub fn len(&self) -> usize {
        self.last_seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_seen.is_empty()
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }
}
