// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! In-memory session store
//!
//! Sessions live behind a single `RwLock`ed map. Closure-based access
//! keeps lock scopes tight; nothing holds the lock across an await.
//! Expired sessions are evicted lazily on insert and by a periodic sweep.

use crate::session::state::{CaptionSession, SessionError};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Default cap on concurrently tracked sessions
pub const DEFAULT_MAX_SESSIONS: usize = 256;

/// Default idle lifetime before a session is evicted (30 minutes)
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 1800;

/// Errors from session lookup and admission
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Session {0} not found")]
    NotFound(Uuid),
    #[error("Session limit reached ({0} active sessions)")]
    Capacity(usize),
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Bounded map of active caption sessions
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, CaptionSession>>,
    max_sessions: usize,
    idle_timeout: Duration,
}

impl SessionStore {
    /// Create a store with explicit bounds
    pub fn new(max_sessions: usize, idle_timeout: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_sessions,
            idle_timeout,
        }
    }

    /// Admit a new session, evicting expired ones first
    pub async fn insert(&self, session: CaptionSession) -> Result<Uuid, StoreError> {
        let mut sessions = self.sessions.write().await;
        Self::evict_expired(&mut sessions, self.idle_timeout);

        if sessions.len() >= self.max_sessions {
            return Err(StoreError::Capacity(sessions.len()));
        }

        let id = session.id();
        sessions.insert(id, session);
        Ok(id)
    }

    /// Run a guarded mutation against one session
    pub async fn update<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut CaptionSession) -> Result<T, SessionError>,
    ) -> Result<T, StoreError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        f(session).map_err(StoreError::from)
    }

    /// Run a read-only closure against one session
    pub async fn read<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&CaptionSession) -> Result<T, SessionError>,
    ) -> Result<T, StoreError> {
        let sessions = self.sessions.read().await;
        let session = sessions.get(&id).ok_or(StoreError::NotFound(id))?;
        f(session).map_err(StoreError::from)
    }

    /// Drop one session, returning whether it existed
    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    /// Number of tracked sessions
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Evict sessions idle past the timeout, returning how many went
    pub async fn evict_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        Self::evict_expired(&mut sessions, self.idle_timeout)
    }

    fn evict_expired(sessions: &mut HashMap<Uuid, CaptionSession>, timeout: Duration) -> usize {
        let before = sessions.len();
        sessions.retain(|_, s| s.idle_for() < timeout);
        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!("Evicted {} idle session(s)", evicted);
        }
        evicted
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_SESSIONS,
            Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS),
        )
    }
}
