// src/web/sessions.rs
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

use crate::types::WizardError;
use crate::wizard::{transition, WizardEvent, WizardState};

pub const DEFAULT_SESSION_TTL_SECS: u64 = 30 * 60;
pub const DEFAULT_MAX_SESSIONS: usize = 1000;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session {0} not found")]
    NotFound(Uuid),

    #[error("session limit of {0} reached")]
    LimitReached(usize),

    #[error(transparent)]
    Wizard(#[from] WizardError),
}

struct SessionEntry {
    state: WizardState,
    last_touched: Instant,
}

/// One `WizardState` per browser session. Every mutation goes through
/// [`transition`] under the lock; the lock is never held across a backend
/// call, so `is_processing` is what keeps a session single-flight.
///
/// Sessions idle for longer than `idle_ttl` are dropped on the next access
/// to the store, unless an analysis is still running for them.
pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, SessionEntry>>,
    idle_ttl: Duration,
    max_sessions: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_limits(
            Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            DEFAULT_MAX_SESSIONS,
        )
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(idle_ttl: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle_ttl,
            max_sessions,
        }
    }

    pub async fn create(&self) -> Result<(Uuid, WizardState), SessionError> {
        let mut sessions = self.sessions.lock().await;
        let now = Instant::now();
        self.evict_idle(&mut sessions, now);

        if sessions.len() >= self.max_sessions {
            warn!(max_sessions = self.max_sessions, "session limit reached");
            return Err(SessionError::LimitReached(self.max_sessions));
        }

        let id = Uuid::new_v4();
        let state = WizardState::new();
        sessions.insert(
            id,
            SessionEntry {
                state: state.clone(),
                last_touched: now,
            },
        );
        info!(session_id = %id, active_sessions = sessions.len(), "session created");

        Ok((id, state))
    }

    pub async fn get(&self, id: Uuid) -> Result<WizardState, SessionError> {
        let mut sessions = self.sessions.lock().await;
        let now = Instant::now();
        self.evict_idle(&mut sessions, now);

        let entry = sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;
        entry.last_touched = now;
        Ok(entry.state.clone())
    }

    /// Apply `event` and return the new state. A rejected event leaves the
    /// stored state untouched.
    pub async fn apply(&self, id: Uuid, event: WizardEvent) -> Result<WizardState, SessionError> {
        let mut sessions = self.sessions.lock().await;
        let now = Instant::now();
        self.evict_idle(&mut sessions, now);

        let entry = sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;
        entry.last_touched = now;

        let next = transition(&entry.state, event)?;
        entry.state = next.clone();

        Ok(next)
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.lock().await.remove(&id).is_some();
        if removed {
            info!(session_id = %id, "session removed");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        let mut sessions = self.sessions.lock().await;
        self.evict_idle(&mut sessions, Instant::now());
        sessions.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn evict_idle(&self, sessions: &mut HashMap<Uuid, SessionEntry>, now: Instant) {
        let before = sessions.len();
        sessions.retain(|_, entry| {
            entry.state.is_processing || now.duration_since(entry.last_touched) < self.idle_ttl
        });

        let evicted = before - sessions.len();
        if evicted > 0 {
            info!(evicted, active_sessions = sessions.len(), "idle sessions evicted");
        }
    }
}
