//! Handler trait — the interface every RPC method binding implements.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use mcp_sessions_core::SessionError;

/// JSON-RPC: method not found.
pub const METHOD_NOT_FOUND: i64 = -32601;
/// JSON-RPC: invalid params.
pub const INVALID_PARAMS: i64 = -32602;
/// JSON-RPC: internal error.
pub const INTERNAL_ERROR: i64 = -32603;
/// MCP: requested resource not found.
pub const RESOURCE_NOT_FOUND: i64 = -32002;

// ─────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────

/// A request-level failure, returned to the caller instead of a result.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("method not found: {0}")]
    MethodNotFound(String),

    #[error("invalid params for {method}: {source}")]
    InvalidParams {
        method: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl HandlerError {
    /// JSON-RPC error code for the response envelope.
    pub fn code(&self) -> i64 {
        match self {
            HandlerError::MethodNotFound(_) => METHOD_NOT_FOUND,
            HandlerError::InvalidParams { .. } => INVALID_PARAMS,
            HandlerError::Session(SessionError::NotFound { .. }) => RESOURCE_NOT_FOUND,
            HandlerError::Session(SessionError::InvalidArgument(_)) => INVALID_PARAMS,
            HandlerError::Session(_) => INTERNAL_ERROR,
        }
    }
}

// ─────────────────────────────────────────────
// Handler trait
// ─────────────────────────────────────────────

/// One RPC method binding.
///
/// The registry dispatches by [`method`](Self::method) and hands over the raw
/// params; the handler returns the raw result.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    /// Method name, e.g. `"session/create"`.
    fn method(&self) -> &str;

    /// Handle one request.
    async fn handle(&self, params: Value) -> Result<Value, HandlerError>;
}

// ─────────────────────────────────────────────
// Param helpers
// ─────────────────────────────────────────────

/// Decode typed params. A missing (`null`) params value decodes as an empty
/// object so that all-optional param types accept it.
pub fn parse_params<T: DeserializeOwned>(method: &str, params: Value) -> Result<T, HandlerError> {
    let params = if params.is_null() {
        Value::Object(Default::default())
    } else {
        params
    };
    serde_json::from_value(params).map_err(|source| HandlerError::InvalidParams {
        method: method.to_string(),
        source,
    })
}

/// Encode a typed result.
pub fn to_result<T: Serialize>(result: &T) -> Result<Value, HandlerError> {
    serde_json::to_value(result)
        .map_err(|e| HandlerError::Session(SessionError::malformed("result", e)))
}
