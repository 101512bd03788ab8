//! Server side of MCP data-layer sessions.
//!
//! This crate contains:
//! - **server**: [`SessionServer`], the facade over a [`SessionStore`](mcp_sessions_core::SessionStore)
//! - **handlers**: the request-handler trait, the method registry, and the
//!   `session/create`, `session/resume`, `session/delete` bindings

pub mod handlers;
pub mod server;

pub use handlers::{register_session_handlers, HandlerError, HandlerRegistry, OwnerFn, RequestHandler};
pub use server::SessionServer;
