//! Server facade — capability negotiation, session resolution, and response meta.
//!
//! Per request, a session is either resolved from `_meta` against the store,
//! rejected (the id is no longer stored; logged, never an error), or absent.

use std::collections::HashMap;
use std::sync::Arc;

use mcp_sessions_core::config::ServerConfig;
use mcp_sessions_core::{
    capability_descriptor, extract_capability, extract_from_meta, inject_into_meta,
    ExperimentalCapabilities, InMemorySessionStore, Meta, Session, SessionDiagnostics,
    SessionFeature, SessionMeta, SessionStore, TracingDiagnostics,
};
use tracing::debug;

// ─────────────────────────────────────────────
// SessionServer
// ─────────────────────────────────────────────

/// Server side of the session protocol.
///
/// Holds no session state of its own; the store owns every record.
pub struct SessionServer {
    store: Arc<dyn SessionStore>,
    features: Vec<SessionFeature>,
    default_ttl_seconds: i64,
    diagnostics: Arc<dyn SessionDiagnostics>,
}

impl SessionServer {
    /// Create a server over `store`, advertising `features`.
    pub fn new(
        store: Arc<dyn SessionStore>,
        features: Vec<SessionFeature>,
        default_ttl_seconds: i64,
    ) -> Self {
        Self {
            store,
            features,
            default_ttl_seconds,
            diagnostics: Arc::new(TracingDiagnostics),
        }
    }

    /// Create a server with an in-memory store configured from `config`.
    pub fn from_config(config: &ServerConfig) -> Self {
        let store = Arc::new(InMemorySessionStore::with_id_prefix(config.id_prefix.clone()));
        Self::new(store, config.session_features(), config.default_ttl_seconds)
    }

    /// Builder: replace the diagnostics sink.
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn SessionDiagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    pub fn features(&self) -> &[SessionFeature] {
        &self.features
    }

    pub fn default_ttl_seconds(&self) -> i64 {
        self.default_ttl_seconds
    }

    // ─────────────────────────────────────────
    // Negotiation
    // ─────────────────────────────────────────

    /// The `experimental` capabilities to advertise during initialization.
    pub fn advertised_capabilities(&self) -> ExperimentalCapabilities {
        capability_descriptor(&self.features)
    }

    /// Whether the client advertised session support.
    pub fn client_supports_sessions(&self, experimental: Option<&ExperimentalCapabilities>) -> bool {
        extract_capability(experimental).is_some()
    }

    // ─────────────────────────────────────────
    // Resolution
    // ─────────────────────────────────────────

    /// Resolve the session a request carries.
    ///
    /// Absent, revoked, and malformed payloads all yield `None`. A session
    /// whose id the store no longer has is reported to diagnostics and also
    /// yields `None`; the store's copy, not the client's, is returned.
    pub fn extract_request_session(&self, meta: Option<&Meta>) -> Option<Session> {
        let presented = match extract_from_meta(meta) {
            Ok(SessionMeta::Present(session)) => session,
            Ok(SessionMeta::Absent) | Ok(SessionMeta::Revoked) => return None,
            Err(e) => {
                debug!(error = %e, "ignoring malformed session in request meta");
                return None;
            }
        };

        match self.store.get(&presented.id) {
            Some(stored) => Some(stored),
            None => {
                self.diagnostics.session_rejected(&presented.id);
                None
            }
        }
    }

    /// Mint a session, using the configured default TTL unless overridden.
    pub fn create_session(
        &self,
        owner: Option<&str>,
        data: HashMap<String, String>,
        ttl_seconds: Option<i64>,
    ) -> Session {
        let ttl = ttl_seconds.unwrap_or(self.default_ttl_seconds);
        let session = self.store.create(owner, data, ttl);
        self.diagnostics.session_created(&session, owner);
        session
    }

    /// Look up a live session by id.
    pub fn resume_session(&self, id: &str) -> Option<Session> {
        self.store.get(id)
    }

    /// Resolve the request's session, or mint one. The flag is `true` when a
    /// new session was created.
    pub fn get_or_create_session(
        &self,
        meta: Option<&Meta>,
        owner: Option<&str>,
        default_data: HashMap<String, String>,
    ) -> (Session, bool) {
        match self.extract_request_session(meta) {
            Some(session) => (session, false),
            None => (self.create_session(owner, default_data, None), true),
        }
    }

    // ─────────────────────────────────────────
    // Response meta
    // ─────────────────────────────────────────

    /// Response meta carrying `session`.
    pub fn prepare_response_meta(&self, session: &Session, existing: Option<&Meta>) -> Meta {
        inject_into_meta(Some(session), existing)
    }

    /// Response meta telling the peer to drop its session. Deletes `id` from
    /// the store first when given; the revocation marker is written either way.
    pub fn prepare_revocation_meta(&self, id: Option<&str>, existing: Option<&Meta>) -> Meta {
        if let Some(id) = id {
            self.store.delete(id);
        }
        self.diagnostics.session_revoked(id);
        inject_into_meta(None, existing)
    }
}
