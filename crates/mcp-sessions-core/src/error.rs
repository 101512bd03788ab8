//! Error taxonomy shared by the store, the facades, and the handlers.
//!
//! "No session" is never an error: absence and revocation travel through
//! [`SessionMeta`](crate::meta::SessionMeta) and `Option<Session>`. The
//! variants here cover the conditions a caller must actually react to.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    /// The store has no live entry for this id (never existed, deleted, or
    /// lazily expired).
    #[error("session not found: {id}")]
    NotFound { id: String },

    /// The peer was obliged to send session state and did not.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    /// A required argument was not available from any source.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A wire payload did not have the expected shape.
    #[error("malformed {what}: {source}")]
    MalformedPayload {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl SessionError {
    #[must_use]
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    #[must_use]
    pub fn malformed(what: &'static str, source: serde_json::Error) -> Self {
        Self::MalformedPayload { what, source }
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
