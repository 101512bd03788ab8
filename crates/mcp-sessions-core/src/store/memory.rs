//! In-memory session store.
//!
//! One `Mutex` guards both the primary map and the owner index, so the two
//! can never disagree. Wall-clock reads happen before the lock is taken.
//! Expiry is lazy: entries are reclaimed when `get` finds them stale.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tracing::debug;

use crate::error::{Result, SessionError};
use crate::store::SessionStore;
use crate::types::{expiry_after, format_expiry, generate_session_id, Session, DEFAULT_ID_PREFIX};

// ─────────────────────────────────────────────
// Guarded state
// ─────────────────────────────────────────────

#[derive(Default)]
struct StoreInner {
    /// Canonical session records keyed by id.
    sessions: HashMap<String, Session>,
    /// Owner → ids that owner created.
    owners: HashMap<String, HashSet<String>>,
}

impl StoreInner {
    fn remove(&mut self, id: &str) -> bool {
        let existed = self.sessions.remove(id).is_some();
        for ids in self.owners.values_mut() {
            ids.remove(id);
        }
        self.owners.retain(|_, ids| !ids.is_empty());
        existed
    }
}

// ─────────────────────────────────────────────
// InMemorySessionStore
// ─────────────────────────────────────────────

/// Process-local [`SessionStore`]. Nothing survives a restart.
pub struct InMemorySessionStore {
    id_prefix: String,
    inner: Mutex<StoreInner>,
}

impl InMemorySessionStore {
    /// Create an empty store using the default `sess-` id prefix.
    pub fn new() -> Self {
        Self::with_id_prefix(DEFAULT_ID_PREFIX)
    }

    /// Create an empty store whose ids start with `prefix`.
    pub fn with_id_prefix(prefix: impl Into<String>) -> Self {
        Self {
            id_prefix: prefix.into(),
            inner: Mutex::new(StoreInner::default()),
        }
    }

    /// Ids currently indexed under `owner`, sorted for determinism.
    pub fn sessions_for_owner(&self, owner: &str) -> Vec<String> {
        let inner = self.lock();
        let mut ids: Vec<String> = inner
            .owners
            .get(owner)
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default();
        ids.sort();
        ids
    }

    /// Number of stored records, including expired ones not yet reclaimed.
    pub fn len(&self) -> usize {
        self.lock().sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().sessions.is_empty()
    }

    // Every critical section leaves both maps consistent, so a poisoned
    // lock still guards valid state.
    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for InMemorySessionStore {
    fn create(
        &self,
        owner: Option<&str>,
        data: HashMap<String, String>,
        ttl_seconds: i64,
    ) -> Session {
        let expiry = expiry_after(Utc::now(), ttl_seconds);
        let session = Session {
            id: generate_session_id(&self.id_prefix),
            expiry: Some(format_expiry(expiry)),
            data,
        };

        let mut inner = self.lock();
        inner.sessions.insert(session.id.clone(), session.clone());
        if let Some(owner) = owner {
            inner
                .owners
                .entry(owner.to_string())
                .or_default()
                .insert(session.id.clone());
        }
        debug!(id = %session.id, owner = ?owner, "stored session");
        session
    }

    fn get(&self, id: &str) -> Option<Session> {
        let now = Utc::now();
        let mut inner = self.lock();
        let session = inner.sessions.get(id)?;
        if session.is_expired(now) {
            inner.remove(id);
            debug!(id = %id, "purged expired session");
            return None;
        }
        Some(session.clone())
    }

    fn update(&self, session: Session) -> Result<Session> {
        let mut inner = self.lock();
        match inner.sessions.get_mut(&session.id) {
            Some(slot) => {
                *slot = session.clone();
                Ok(session)
            }
            None => Err(SessionError::not_found(session.id)),
        }
    }

    fn delete(&self, id: &str) {
        if self.lock().remove(id) {
            debug!(id = %id, "deleted session");
        }
    }
}
