//! Session storage — the contract every backend satisfies.
//!
//! The server facade only talks to [`SessionStore`]; [`InMemorySessionStore`]
//! is the reference backend. Other backends (durable, shared) plug in at
//! construction time behind the same trait.

pub mod memory;

pub use memory::InMemorySessionStore;

use std::collections::HashMap;

use crate::error::Result;
use crate::types::Session;

/// Keyed session storage with TTL-based expiry.
///
/// Implementations must make each operation atomic with respect to the
/// others: a concurrent reader never sees an id in the owner index that is
/// missing from the primary records, or the reverse.
pub trait SessionStore: Send + Sync {
    /// Mint a new session expiring `ttl_seconds` from now and record it under
    /// `owner`, if given. A TTL of zero or less yields an already-expired
    /// session.
    fn create(&self, owner: Option<&str>, data: HashMap<String, String>, ttl_seconds: i64)
        -> Session;

    /// Look up a live session. Expired entries are removed and reported as
    /// `None`, same as unknown ids.
    fn get(&self, id: &str) -> Option<Session>;

    /// Replace the stored record with the same id. Fails with
    /// [`SessionError::NotFound`](crate::error::SessionError::NotFound) when
    /// no such id exists. Never merges.
    fn update(&self, session: Session) -> Result<Session>;

    /// Remove a session and scrub it from every owner index. Idempotent.
    fn delete(&self, id: &str);
}
