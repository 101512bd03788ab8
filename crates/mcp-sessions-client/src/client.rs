//! Client facade — a single-slot session jar.
//!
//! Remembers at most one session, attaches it to outgoing `_meta`, and
//! applies the tri-state rule to incoming `_meta`: a session replaces the
//! cached one, `null` clears it, an absent key leaves it alone.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tracing::debug;

use mcp_sessions_core::config::ClientConfig;
use mcp_sessions_core::protocol::{
    SessionCreateHints, SessionCreateParams, SessionDeleteParams, SessionResumeParams,
};
use mcp_sessions_core::{
    capability_descriptor, extract_capability, extract_from_meta, inject_into_meta,
    ExperimentalCapabilities, Meta, Session, SessionDiagnostics, SessionError, SessionFeature,
    SessionMeta, TracingDiagnostics,
};

type Result<T> = std::result::Result<T, SessionError>;

// ─────────────────────────────────────────────
// Client state
// ─────────────────────────────────────────────

#[derive(Default)]
struct ClientState {
    session: Option<Session>,
    server_has_sessions: bool,
    server_has_create: bool,
    server_has_resume: bool,
    server_has_delete: bool,
}

// ─────────────────────────────────────────────
// SessionClient
// ─────────────────────────────────────────────

/// Client side of the session protocol.
///
/// Interior locking lets one client be shared across tasks; the cached
/// session and the negotiated flags sit behind the same mutex.
pub struct SessionClient {
    features: Vec<SessionFeature>,
    state: Mutex<ClientState>,
    diagnostics: Arc<dyn SessionDiagnostics>,
}

impl SessionClient {
    /// Create a client that advertises no optional features.
    pub fn new() -> Self {
        Self::with_features(Vec::new())
    }

    /// Create a client advertising `features`.
    pub fn with_features(features: Vec<SessionFeature>) -> Self {
        Self {
            features,
            state: Mutex::new(ClientState::default()),
            diagnostics: Arc::new(TracingDiagnostics),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::with_features(config.session_features())
    }

    /// Builder: replace the diagnostics sink.
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn SessionDiagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// The cached session, if any.
    pub fn session(&self) -> Option<Session> {
        self.lock().session.clone()
    }

    /// Replace the cached session directly, e.g. one restored from elsewhere.
    pub fn set_session(&self, session: Option<Session>) {
        self.lock().session = session;
    }

    // ─────────────────────────────────────────
    // Negotiation
    // ─────────────────────────────────────────

    /// The `experimental` capabilities to advertise during initialization.
    pub fn advertised_capabilities(&self) -> ExperimentalCapabilities {
        capability_descriptor(&self.features)
    }

    /// Record what the server advertised. Returns whether it supports
    /// sessions at all.
    pub fn negotiate(&self, experimental: Option<&ExperimentalCapabilities>) -> bool {
        let cap = extract_capability(experimental);
        let has = |feature: SessionFeature| cap.as_ref().is_some_and(|c| c.supports(feature));

        let mut state = self.lock();
        state.server_has_sessions = cap.is_some();
        state.server_has_create = has(SessionFeature::Create);
        state.server_has_resume = has(SessionFeature::Resume);
        state.server_has_delete = has(SessionFeature::Delete);
        debug!(
            sessions = state.server_has_sessions,
            create = state.server_has_create,
            resume = state.server_has_resume,
            delete = state.server_has_delete,
            "negotiated session capability"
        );
        state.server_has_sessions
    }

    /// Whether the last negotiation found session support.
    pub fn server_supports_sessions(&self) -> bool {
        self.lock().server_has_sessions
    }

    /// Whether the server declared `feature` during the last negotiation.
    pub fn supports(&self, feature: SessionFeature) -> bool {
        let state = self.lock();
        match feature {
            SessionFeature::Create => state.server_has_create,
            SessionFeature::Resume => state.server_has_resume,
            SessionFeature::Delete => state.server_has_delete,
        }
    }

    // ─────────────────────────────────────────
    // Meta
    // ─────────────────────────────────────────

    /// Meta for an outgoing request. Without a cached session, `existing` is
    /// passed through untouched (no revocation marker is forced).
    pub fn prepare_request_meta(&self, existing: Option<&Meta>) -> Meta {
        match self.lock().session.as_ref() {
            Some(session) => inject_into_meta(Some(session), existing),
            None => existing.cloned().unwrap_or_default(),
        }
    }

    /// Apply incoming meta to the cache and return the resulting session.
    pub fn consume_response_meta(&self, meta: Option<&Meta>) -> Result<Option<Session>> {
        let extracted = extract_from_meta(meta)?;
        Ok(self.apply(extracted))
    }

    fn apply(&self, extracted: SessionMeta) -> Option<Session> {
        let mut state = self.lock();
        match extracted {
            SessionMeta::Absent => {}
            SessionMeta::Revoked => {
                let previous = state.session.take();
                self.diagnostics
                    .session_revoked(previous.as_ref().map(|s| s.id.as_str()));
            }
            SessionMeta::Present(session) => {
                self.diagnostics.session_adopted(&session);
                state.session = Some(session);
            }
        }
        state.session.clone()
    }

    // ─────────────────────────────────────────
    // Requests
    // ─────────────────────────────────────────

    /// Params for `session/create`. Hints are omitted when both are empty.
    pub fn build_create_request(
        &self,
        label: Option<&str>,
        data: Option<HashMap<String, String>>,
    ) -> SessionCreateParams {
        let hints = SessionCreateHints {
            label: label.map(str::to_string),
            data,
        };
        SessionCreateParams {
            hints: (!hints.is_empty()).then_some(hints),
        }
    }

    /// Params for `session/resume`.
    pub fn build_resume_request(&self, id: &str) -> SessionResumeParams {
        SessionResumeParams { id: id.to_string() }
    }

    /// Params for `session/delete`, defaulting to the cached session's id.
    pub fn build_delete_request(&self, id: Option<&str>) -> Result<SessionDeleteParams> {
        let id = match id.filter(|id| !id.is_empty()) {
            Some(id) => id.to_string(),
            None => self
                .lock()
                .session
                .as_ref()
                .map(|s| s.id.clone())
                .ok_or_else(|| {
                    SessionError::InvalidArgument(
                        "no session id given and no session cached".to_string(),
                    )
                })?,
        };
        Ok(SessionDeleteParams { id })
    }

    // ─────────────────────────────────────────
    // Results
    // ─────────────────────────────────────────

    /// Process a `session/create` or `session/resume` result. Servers must
    /// put the session in `_meta` on these; anything else is a protocol
    /// violation.
    pub fn process_create_or_resume_result(&self, result: &Value) -> Result<Session> {
        let meta = result_meta(result)?;
        match extract_from_meta(meta.as_ref())? {
            SessionMeta::Present(session) => {
                self.apply(SessionMeta::Present(session.clone()));
                Ok(session)
            }
            other => {
                self.apply(other);
                Err(SessionError::ProtocolViolation(format!(
                    "session/create or session/resume response is missing _meta.{}",
                    mcp_sessions_core::SESSION_META_KEY
                )))
            }
        }
    }

    /// Process a `session/delete` result. Returns the server's `deleted` flag.
    pub fn process_delete_result(&self, result: &Value) -> Result<bool> {
        let meta = result_meta(result)?;
        self.consume_response_meta(meta.as_ref())?;
        Ok(result
            .get("deleted")
            .and_then(Value::as_bool)
            .unwrap_or(false))
    }

    // The cache is a plain Option; a poisoned lock still holds a valid value.
    fn lock(&self) -> MutexGuard<'_, ClientState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SessionClient {
    fn default() -> Self {
        Self::new()
    }
}

/// The result's `_meta`, falling back to `meta`. Null counts as missing.
fn result_meta(result: &Value) -> Result<Option<Meta>> {
    let raw = ["_meta", "meta"]
        .iter()
        .filter_map(|key| result.get(*key))
        .find(|v| !v.is_null());
    match raw {
        None => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| SessionError::malformed("result meta", e)),
    }
}
