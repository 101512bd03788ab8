//! Core of MCP data-layer sessions.
//!
//! This crate contains:
//! - **types**: the [`Session`] record, id generation, expiry, feature names
//! - **meta**: the `_meta` carrier and its tri-state session slot
//! - **capability**: the `experimental.session` capability descriptor
//! - **protocol**: params/results of `session/create`, `session/resume`, `session/delete`
//! - **store**: the [`SessionStore`] trait and the in-memory backend
//! - **diagnostics**: the injected lifecycle event sink
//! - **config**: JSON + env configuration

pub mod capability;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod meta;
pub mod protocol;
pub mod store;
pub mod types;
pub mod utils;

pub use capability::{
    capability_descriptor, extract_capability, ExperimentalCapabilities, SessionCapability,
    SESSION_CAPABILITY_KEY,
};
pub use diagnostics::{RecordingDiagnostics, SessionDiagnostics, TracingDiagnostics};
pub use error::SessionError;
pub use meta::{extract_from_meta, inject_into_meta, Meta, SessionMeta, SESSION_META_KEY};
pub use store::{InMemorySessionStore, SessionStore};
pub use types::{generate_session_id, Session, SessionFeature};
