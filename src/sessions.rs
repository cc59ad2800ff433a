// src/sessions.rs
use crate::view::ViewController;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

pub type SharedController = Arc<Mutex<ViewController>>;

struct SessionEntry {
    controller: SharedController,
    last_seen: Instant,
}

/// In-memory browsing sessions. Each controller has its own lock so a slow
/// assistant call on one session never blocks another.
///
/// Sessions idle for longer than `idle_ttl` are pruned when a new one is
/// created, and the least recently used session is evicted once
/// `max_sessions` is reached.
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
    idle_ttl: Duration,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(idle_ttl: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_ttl,
            max_sessions: max_sessions.max(1),
        }
    }

    pub async fn create(&self) -> (Uuid, SharedController) {
        self.create_at(Instant::now()).await
    }

    async fn create_at(&self, now: Instant) -> (Uuid, SharedController) {
        let id = Uuid::new_v4();
        let controller = Arc::new(Mutex::new(ViewController::new()));

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| now.saturating_duration_since(entry.last_seen) <= self.idle_ttl);
        let pruned = before - sessions.len();
        if pruned > 0 {
            tracing::debug!(pruned, "idle browsing sessions pruned");
        }

        while sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(id, _)| *id);
            match oldest {
                Some(oldest) => {
                    sessions.remove(&oldest);
                    tracing::info!(session_id = %oldest, "session cap reached, least recently used session evicted");
                }
                None => break,
            }
        }

        sessions.insert(
            id,
            SessionEntry {
                controller: controller.clone(),
                last_seen: now,
            },
        );
        tracing::info!(session_id = %id, "browsing session created");
        (id, controller)
    }

    /// Returns the session and marks it as recently used.
    pub async fn get(&self, id: &Uuid) -> Option<SharedController> {
        self.get_at(id, Instant::now()).await
    }

    async fn get_at(&self, id: &Uuid, now: Instant) -> Option<SharedController> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(id)?;
        entry.last_seen = now;
        Some(entry.controller.clone())
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
