//! Diagnostics sink injected into the server and client facades.
//!
//! The facades never log through a global; they report lifecycle events to
//! a [`SessionDiagnostics`] handed to them at construction.
//! [`TracingDiagnostics`] forwards those events to `tracing`.

use std::sync::{Mutex, PoisonError};

use tracing::{debug, info};

use crate::types::Session;

/// Receives session lifecycle events.
pub trait SessionDiagnostics: Send + Sync {
    /// The server minted a new session.
    fn session_created(&self, session: &Session, owner: Option<&str>);

    /// A request presented a session id the store no longer knows.
    fn session_rejected(&self, id: &str);

    /// A session was revoked. `id` is `None` when the revoking side did not
    /// know which session it was.
    fn session_revoked(&self, id: Option<&str>);

    /// The client cached a session received from the server.
    fn session_adopted(&self, session: &Session);
}

/// Default sink: structured `tracing` events.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingDiagnostics;

impl SessionDiagnostics for TracingDiagnostics {
    fn session_created(&self, session: &Session, owner: Option<&str>) {
        info!(id = %session.id, owner = ?owner, expiry = ?session.expiry, "session created");
    }

    fn session_rejected(&self, id: &str) {
        info!(id = %id, "rejected unknown or expired session");
    }

    fn session_revoked(&self, id: Option<&str>) {
        info!(id = ?id, "session revoked");
    }

    fn session_adopted(&self, session: &Session) {
        debug!(id = %session.id, "session adopted");
    }
}

/// Sink that keeps events in memory as `kind:id` strings, for inspection
/// and tests.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    events: Mutex<Vec<String>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded events, oldest first.
    pub fn events(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn push(&self, event: String) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl SessionDiagnostics for RecordingDiagnostics {
    fn session_created(&self, session: &Session, _owner: Option<&str>) {
        self.push(format!("created:{}", session.id));
    }

    fn session_rejected(&self, id: &str) {
        self.push(format!("rejected:{id}"));
    }

    fn session_revoked(&self, id: Option<&str>) {
        self.push(format!("revoked:{}", id.unwrap_or("-")));
    }

    fn session_adopted(&self, session: &Session) {
        self.push(format!("adopted:{}", session.id));
    }
}
