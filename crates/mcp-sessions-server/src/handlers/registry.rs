//! Handler registry — dispatches inbound requests to their method binding.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use super::base::{HandlerError, RequestHandler};

// ─────────────────────────────────────────────
// Registry
// ─────────────────────────────────────────────

/// Stores handlers keyed by method name and dispatches requests.
///
/// Owns `Arc<dyn RequestHandler>` so one registry can serve concurrent
/// requests from many tasks.
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn RequestHandler>>,
}

impl HandlerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler. Overwrites any previous handler for the same method.
    pub fn register(&mut self, handler: Arc<dyn RequestHandler>) {
        info!(method = handler.method(), "registered handler");
        self.handlers.insert(handler.method().to_string(), handler);
    }

    /// Check if a method is bound.
    pub fn has(&self, method: &str) -> bool {
        self.handlers.contains_key(method)
    }

    /// Names of all bound methods, sorted for determinism.
    pub fn methods(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Dispatch one request.
    pub async fn dispatch(&self, method: &str, params: Value) -> Result<Value, HandlerError> {
        let handler = match self.handlers.get(method) {
            Some(h) => h,
            None => {
                warn!(method, "no handler for method");
                return Err(HandlerError::MethodNotFound(method.to_string()));
            }
        };

        handler.handle(params).await.inspect_err(|e| {
            warn!(method, error = %e, "request failed");
        })
    }

    /// Number of bound methods.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
