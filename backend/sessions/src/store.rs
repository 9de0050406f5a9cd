//! Process-wide store of caller conversation sessions.
//!
//! Keyed by caller phone number. Each session holds the ordered transcript
//! of the call; only the most recent [`HISTORY_WINDOW`] turns are handed to
//! the intent resolver. The store itself is bounded: past
//! [`MAX_SESSIONS`] distinct callers, the least-recently-active caller is
//! evicted so a long-running process cannot accumulate sessions without
//! limit.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use frontdesk_core::{Role, Turn};

/// Turns sent upstream when assembling an intent-resolution prompt.
pub const HISTORY_WINDOW: usize = 10;

/// Stored turns per caller; the oldest are dropped beyond this.
pub const MAX_TRANSCRIPT: usize = 100;

/// Distinct callers held at once.
pub const MAX_SESSIONS: usize = 1024;

/// A single caller's conversation state.
#[derive(Debug, Clone)]
struct CallerSession {
    transcript: Vec<Turn>,
    last_active: DateTime<Utc>,
}

impl CallerSession {
    fn new() -> Self {
        Self {
            transcript: Vec::new(),
            last_active: Utc::now(),
        }
    }

    fn push(&mut self, turn: Turn) {
        self.transcript.push(turn);
        if self.transcript.len() > MAX_TRANSCRIPT {
            let excess = self.transcript.len() - MAX_TRANSCRIPT;
            self.transcript.drain(..excess);
        }
        self.last_active = Utc::now();
    }

    fn recent(&self) -> Vec<Turn> {
        let skip = self.transcript.len().saturating_sub(HISTORY_WINDOW);
        self.transcript[skip..].to_vec()
    }
}

/// Shared, bounded map of caller id to conversation session.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, CallerSession>>>,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_capacity(MAX_SESSIONS)
    }

    pub fn with_capacity(max_sessions: usize) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            max_sessions,
        }
    }

    /// Append a turn to the caller's session, creating it if absent.
    /// Returns the updated last-[`HISTORY_WINDOW`] view. Never fails.
    pub async fn append_turn(&self, caller_id: &str, role: Role, text: &str) -> Vec<Turn> {
        let mut w = self.sessions.write().await;
        if !w.contains_key(caller_id) && w.len() >= self.max_sessions {
            Self::evict_stalest(&mut w);
        }
        let session = w
            .entry(caller_id.to_string())
            .or_insert_with(CallerSession::new);
        session.push(Turn::new(role, text));
        session.recent()
    }

    /// Last-[`HISTORY_WINDOW`] view without mutating the session.
    /// Unknown callers yield an empty history.
    pub async fn recent(&self, caller_id: &str) -> Vec<Turn> {
        let r = self.sessions.read().await;
        r.get(caller_id).map(|s| s.recent()).unwrap_or_default()
    }

    /// Remove the caller's session. Idempotent.
    pub async fn clear(&self, caller_id: &str) {
        let mut w = self.sessions.write().await;
        if w.remove(caller_id).is_some() {
            debug!(caller = %caller_id, "session cleared");
        }
    }

    /// Number of callers currently held.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    fn evict_stalest(sessions: &mut HashMap<String, CallerSession>) {
        let stalest = sessions
            .iter()
            .min_by_key(|(_, s)| s.last_active)
            .map(|(id, _)| id.clone());
        if let Some(id) = stalest {
            sessions.remove(&id);
            debug!(caller = %id, "evicted least-recently-active session");
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_append_creates_session_and_returns_window() {
        let store = SessionStore::new();
        let view = store.append_turn("+48111222333", Role::Caller, "dzień dobry").await;
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].role, Role::Caller);
        assert_eq!(view[0].text, "dzień dobry");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_window_holds_last_ten_turns() {
        let store = SessionStore::new();
        for i in 0..25 {
            store
                .append_turn("+48111222333", Role::Caller, &format!("turn {i}"))
                .await;
        }
        let view = store.recent("+48111222333").await;
        assert_eq!(view.len(), HISTORY_WINDOW);
        assert_eq!(view[0].text, "turn 15");
        assert_eq!(view.last().unwrap().text, "turn 24");
    }

    #[tokio::test]
    async fn test_transcript_is_capped() {
        let store = SessionStore::new();
        for i in 0..(MAX_TRANSCRIPT + 50) {
            store
                .append_turn("+48111222333", Role::Assistant, &format!("t{i}"))
                .await;
        }
        // The window still reads from the trimmed tail.
        let view = store.recent("+48111222333").await;
        assert_eq!(view.last().unwrap().text, format!("t{}", MAX_TRANSCRIPT + 49));
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let store = SessionStore::new();
        store.append_turn("+48111", Role::Caller, "halo").await;
        store.clear("+48111").await;
        store.clear("+48111").await;
        assert!(store.recent("+48111").await.is_empty());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_evicts_least_recently_active_caller() {
        let store = SessionStore::with_capacity(2);
        store.append_turn("first", Role::Caller, "a").await;
        store.append_turn("second", Role::Caller, "b").await;
        // Touch "first" so "second" becomes the stalest.
        store.append_turn("first", Role::Caller, "c").await;
        store.append_turn("third", Role::Caller, "d").await;

        assert_eq!(store.len().await, 2);
        assert!(store.recent("second").await.is_empty());
        assert!(!store.recent("first").await.is_empty());
        assert!(!store.recent("third").await.is_empty());
    }
}
