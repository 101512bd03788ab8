//! Meta carrier — how session state rides inside per-message `_meta`.
//!
//! The reserved key is tri-state:
//! - absent → no information, leave client state alone
//! - a session object → adopt it
//! - `null` → revoked, drop any cached session
//!
//! [`SessionMeta`] keeps all three apart; collapsing "absent" and "revoked"
//! into one `None` would lose the revocation signal.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::types::Session;

/// Reserved `_meta` key carrying the session payload.
pub const SESSION_META_KEY: &str = "mcp/session";

// ─────────────────────────────────────────────
// Meta carrier
// ─────────────────────────────────────────────

/// Generic per-message metadata map.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meta(Map<String, Value>);

impl Meta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Meta {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

// ─────────────────────────────────────────────
// Tri-state session payload
// ─────────────────────────────────────────────

/// What a message's meta says about the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionMeta {
    /// No meta, or the reserved key is not set.
    Absent,
    /// The reserved key is explicitly null: the session was revoked.
    Revoked,
    /// The reserved key carries a session to adopt.
    Present(Session),
}

impl SessionMeta {
    /// The carried session, if any.
    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionMeta::Present(session) => Some(session),
            SessionMeta::Absent | SessionMeta::Revoked => None,
        }
    }
}

/// Set the reserved key on a copy of `existing` — to the session's wire form,
/// or to `null` when `session` is `None`. The key is always written, so its
/// presence alone means "this message carries session information".
pub fn inject_into_meta(session: Option<&Session>, existing: Option<&Meta>) -> Meta {
    let mut meta = existing.cloned().unwrap_or_default();
    let value = session.map(Session::to_wire).unwrap_or(Value::Null);
    meta.insert(SESSION_META_KEY, value);
    meta
}

/// Read the reserved key back as a [`SessionMeta`].
///
/// `null` and an empty object both read as [`SessionMeta::Revoked`]. Any other
/// payload must decode as a session; a malformed one is an error rather than
/// a silent "no session".
pub fn extract_from_meta(meta: Option<&Meta>) -> Result<SessionMeta> {
    let Some(value) = meta.and_then(|m| m.get(SESSION_META_KEY)) else {
        return Ok(SessionMeta::Absent);
    };
    match value {
        Value::Null => Ok(SessionMeta::Revoked),
        Value::Object(map) if map.is_empty() => Ok(SessionMeta::Revoked),
        other => Session::from_wire(other.clone()).map(SessionMeta::Present),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meta_from(value: Value) -> Meta {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_inject_session() {
        let meta = inject_into_meta(Some(&Session::new("sess-1")), None);
        assert_eq!(meta.get(SESSION_META_KEY), Some(&json!({"id": "sess-1"})));
    }

    #[test]
    fn test_inject_null_sets_key() {
        let meta = inject_into_meta(None, None);
        assert!(meta.contains_key(SESSION_META_KEY));
        assert_eq!(meta.get(SESSION_META_KEY), Some(&Value::Null));
    }

    #[test]
    fn test_inject_preserves_other_keys_and_overwrites_session() {
        let existing = meta_from(json!({"progressToken": 5, "mcp/session": {"id": "old"}}));
        let meta = inject_into_meta(Some(&Session::new("new")), Some(&existing));
        assert_eq!(meta.get("progressToken"), Some(&json!(5)));
        assert_eq!(meta.get(SESSION_META_KEY), Some(&json!({"id": "new"})));
        // the input is left untouched
        assert_eq!(existing.get(SESSION_META_KEY), Some(&json!({"id": "old"})));
    }

    #[test]
    fn test_extract_absent() {
        assert_eq!(extract_from_meta(None).unwrap(), SessionMeta::Absent);
        let meta = meta_from(json!({"other": true}));
        assert_eq!(extract_from_meta(Some(&meta)).unwrap(), SessionMeta::Absent);
    }

    #[test]
    fn test_revocation_distinct_from_absent() {
        let revoked = inject_into_meta(None, None);
        assert_eq!(extract_from_meta(Some(&revoked)).unwrap(), SessionMeta::Revoked);
        assert_ne!(extract_from_meta(Some(&Meta::new())).unwrap(), SessionMeta::Revoked);
    }

    #[test]
    fn test_empty_object_is_revocation() {
        let meta = meta_from(json!({"mcp/session": {}}));
        assert_eq!(extract_from_meta(Some(&meta)).unwrap(), SessionMeta::Revoked);
    }

    #[test]
    fn test_extract_present() {
        let session = Session::new("sess-9");
        let meta = inject_into_meta(Some(&session), None);
        let extracted = extract_from_meta(Some(&meta)).unwrap();
        assert_eq!(extracted.session(), Some(&session));
    }

    #[test]
    fn test_extract_malformed_is_error() {
        let meta = meta_from(json!({"mcp/session": "sess-1"}));
        assert!(extract_from_meta(Some(&meta)).is_err());
    }
}
