//! `session/create`, `session/resume`, `session/delete` bindings.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use mcp_sessions_core::protocol::{
    SessionCreateParams, SessionDeleteParams, SessionDeleteResult, SessionResult,
    SessionResumeParams, LABEL_DATA_KEY, METHOD_CREATE, METHOD_DELETE, METHOD_RESUME,
};
use mcp_sessions_core::SessionError;

use super::base::{parse_params, to_result, HandlerError, RequestHandler};
use super::registry::HandlerRegistry;
use crate::server::SessionServer;

/// Supplies the calling principal at session-creation time, for owner
/// bookkeeping only.
pub type OwnerFn = Arc<dyn Fn() -> Option<String> + Send + Sync>;

// ─────────────────────────────────────────────
// session/create
// ─────────────────────────────────────────────

pub struct SessionCreateHandler {
    server: Arc<SessionServer>,
    get_owner: Option<OwnerFn>,
}

impl SessionCreateHandler {
    pub fn new(server: Arc<SessionServer>, get_owner: Option<OwnerFn>) -> Self {
        Self { server, get_owner }
    }
}

#[async_trait]
impl RequestHandler for SessionCreateHandler {
    fn method(&self) -> &str {
        METHOD_CREATE
    }

    async fn handle(&self, params: Value) -> Result<Value, HandlerError> {
        let params: SessionCreateParams = parse_params(METHOD_CREATE, params)?;
        let hints = params.hints.unwrap_or_default();

        let mut data = hints.data.unwrap_or_default();
        if let Some(label) = hints.label {
            // an explicit data entry wins over the label hint
            data.entry(LABEL_DATA_KEY.to_string()).or_insert(label);
        }

        let owner = self.get_owner.as_ref().and_then(|f| f());
        let session = self.server.create_session(owner.as_deref(), data, None);
        let meta = self.server.prepare_response_meta(&session, None);
        to_result(&SessionResult::new(&session, meta))
    }
}

// ─────────────────────────────────────────────
// session/resume
// ─────────────────────────────────────────────

pub struct SessionResumeHandler {
    server: Arc<SessionServer>,
}

impl SessionResumeHandler {
    pub fn new(server: Arc<SessionServer>) -> Self {
        Self { server }
    }
}

#[async_trait]
impl RequestHandler for SessionResumeHandler {
    fn method(&self) -> &str {
        METHOD_RESUME
    }

    async fn handle(&self, params: Value) -> Result<Value, HandlerError> {
        let params: SessionResumeParams = parse_params(METHOD_RESUME, params)?;

        // Expired and never-existed ids are indistinguishable here.
        let session = self
            .server
            .resume_session(&params.id)
            .ok_or_else(|| SessionError::not_found(&params.id))?;

        let meta = self.server.prepare_response_meta(&session, None);
        to_result(&SessionResult::new(&session, meta))
    }
}

// ─────────────────────────────────────────────
// session/delete
// ─────────────────────────────────────────────

pub struct SessionDeleteHandler {
    server: Arc<SessionServer>,
}

impl SessionDeleteHandler {
    pub fn new(server: Arc<SessionServer>) -> Self {
        Self { server }
    }
}

#[async_trait]
impl RequestHandler for SessionDeleteHandler {
    fn method(&self) -> &str {
        METHOD_DELETE
    }

    async fn handle(&self, params: Value) -> Result<Value, HandlerError> {
        let params: SessionDeleteParams = parse_params(METHOD_DELETE, params)?;

        let deleted = self.server.store().get(&params.id).is_some();
        if !deleted {
            debug!(id = %params.id, "delete of unknown or expired session");
        }
        // Revocation meta goes out even when nothing was removed.
        let meta = self.server.prepare_revocation_meta(Some(&params.id), None);

        to_result(&SessionDeleteResult {
            deleted,
            meta: Some(meta),
        })
    }
}

// ─────────────────────────────────────────────
// Registration
// ─────────────────────────────────────────────

/// Bind all three `session/*` methods to `server`.
pub fn register_session_handlers(
    registry: &mut HandlerRegistry,
    server: Arc<SessionServer>,
    get_owner: Option<OwnerFn>,
) {
    registry.register(Arc::new(SessionCreateHandler::new(server.clone(), get_owner)));
    registry.register(Arc::new(SessionResumeHandler::new(server.clone())));
    registry.register(Arc::new(SessionDeleteHandler::new(server)));
}
