//! Client side of MCP data-layer sessions.
//!
//! [`SessionClient`] negotiates session support, keeps the one active
//! session, and shapes `session/*` requests and `_meta` on every message.

pub mod client;

pub use client::SessionClient;
