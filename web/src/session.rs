//! Per-browser UI state, keyed by the session cookie.

use std::time::{Duration, Instant};

use credit_client::ClientState;
use dashmap::DashMap;
use log::{info, warn};

pub const SESSION_COOKIE: &str = "credit_session";

struct Entry {
    state: ClientState,
    last_seen: Instant,
}

pub struct SessionStore {
    sessions: DashMap<String, Entry>,
    idle_timeout: Duration,
    max_sessions: usize,
}

impl SessionStore {
    /// `max_sessions` is clamped to at least one.
    pub fn new(idle_timeout: Duration, max_sessions: usize) -> Self {
        SessionStore {
            sessions: DashMap::new(),
            idle_timeout,
            max_sessions: max_sessions.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns the id to use for this request, creating a session when the
    /// cookie is absent or unknown.
    pub fn resolve(&self, cookie: Option<&str>) -> (String, bool) {
        if let Some(id) = cookie {
            if let Some(mut entry) = self.sessions.get_mut(id) {
                entry.last_seen = Instant::now();
                return (id.to_string(), false);
            }
        }

        let id = uuid::Uuid::new_v4().to_string();
        self.insert_fresh(&id);
        (id, true)
    }

    /// Runs `f` on the session's state, recreating it if it was pruned since
    /// `resolve`. The map guard is released before this returns, so callers
    /// must not `.await` inside `f`.
    pub fn with<R>(&self, id: &str, f: impl FnOnce(&mut ClientState) -> R) -> R {
        if !self.sessions.contains_key(id) {
            self.insert_fresh(id);
        }
        let mut entry = self.sessions.entry(id.to_string()).or_insert_with(|| Entry {
            state: ClientState::new(),
            last_seen: Instant::now(),
        });
        entry.last_seen = Instant::now();
        f(&mut entry.state)
    }

    /// Drops sessions idle for longer than the timeout.
    pub fn prune(&self) -> usize {
        let before = self.sessions.len();
        let timeout = self.idle_timeout;
        self.sessions.retain(|_, entry| entry.last_seen.elapsed() <= timeout);
        let pruned = before.saturating_sub(self.sessions.len());
        if pruned > 0 {
            info!("Pruned {pruned} idle sessions");
        }
        pruned
    }

    /// Prunes, then evicts least recently seen sessions until there is room.
    fn insert_fresh(&self, id: &str) {
        self.prune();
        while self.sessions.len() >= self.max_sessions {
            let oldest = self
                .sessions
                .iter()
                .min_by_key(|entry| entry.last_seen)
                .map(|entry| entry.key().clone());
            match oldest {
                Some(key) => {
                    self.sessions.remove(&key);
                    warn!("Session limit {} reached, evicted {key}", self.max_sessions);
                }
                None => break,
            }
        }
        self.sessions.insert(
            id.to_string(),
            Entry {
                state: ClientState::new(),
                last_seen: Instant::now(),
            },
        );
    }
}
