//! Session storage
//!
//! Sessions live in memory only. Each one is wrapped in its own async mutex
//! so turns on the same session run one at a time while different sessions
//! proceed in parallel.

use crate::chat::{ChatSession, SessionStats};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};

pub type SharedSession = Arc<Mutex<ChatSession>>;

pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// Storage for live sessions, keyed by session id
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, session_id: &str) -> Option<SharedSession>;

    async fn set(&self, session_id: String, session: SharedSession);

    /// Returns false if there was no such session
    async fn delete(&self, session_id: &str) -> bool;

    async fn list(&self) -> Vec<SessionStats>;
}

struct Entry {
    session: SharedSession,
    last_access: Instant,
}

/// In-memory store with idle expiry and a capacity bound.
///
/// When full, inserting a new session evicts the least recently used one.
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Entry>>,
    ttl: Duration,
    capacity: usize,
}

impl InMemorySessionStore {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
            capacity: capacity.max(1),
        }
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop sessions idle for longer than the TTL. Returns how many went.
    pub async fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now()).await
    }

    async fn purge_expired_at(&self, now: Instant) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| now.saturating_duration_since(entry.last_access) <= self.ttl);
        let purged = before - sessions.len();
        if purged > 0 {
            tracing::info!(purged, remaining = sessions.len(), "Purged idle sessions");
        }
        purged
    }

    /// Spawn a task that purges expired sessions every `interval`
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                store.purge_expired().await;
            }
        })
    }

    #[cfg(test)]
    async fn backdate(&self, session_id: &str, by: Duration) {
        if let Some(entry) = self.sessions.write().await.get_mut(session_id) {
            if let Some(at) = entry.last_access.checked_sub(by) {
                entry.last_access = at;
            }
        }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL, DEFAULT_MAX_SESSIONS)
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, session_id: &str) -> Option<SharedSession> {
        let mut sessions = self.sessions.write().await;
        let now = Instant::now();
        let expired = now.saturating_duration_since(sessions.get(session_id)?.last_access) > self.ttl;
        if expired {
            sessions.remove(session_id);
            tracing::debug!(session_id, "Session expired on access");
            return None;
        }
        let entry = sessions.get_mut(session_id)?;
        entry.last_access = now;
        Some(Arc::clone(&entry.session))
    }

    async fn set(&self, session_id: String, session: SharedSession) {
        let mut sessions = self.sessions.write().await;

        if !sessions.contains_key(&session_id) && sessions.len() >= self.capacity {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_access)
                .map(|(id, _)| id.clone());
            if let Some(oldest) = oldest {
                sessions.remove(&oldest);
                tracing::info!(session_id = %oldest, "Evicted least recently used session");
            }
        }

        sessions.insert(
            session_id,
            Entry {
                session,
                last_access: Instant::now(),
            },
        );
    }

    async fn delete(&self, session_id: &str) -> bool {
        self.sessions.write().await.remove(session_id).is_some()
    }

    async fn list(&self) -> Vec<SessionStats> {
        let handles: Vec<SharedSession> = self
            .sessions
            .read()
            .await
            .values()
            .map(|entry| Arc::clone(&entry.session))
            .collect();

        let mut stats = Vec::with_capacity(handles.len());
        for handle in handles {
            stats.push(handle.lock().await.stats());
        }
        stats.sort_by_key(|s| s.start_time);
        stats
    }
}
