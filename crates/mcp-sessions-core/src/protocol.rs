//! Wire records for the `session/*` methods.
//!
//! Typed replacements for free-form JSON params/results. Every result carries
//! its session state in `_meta` (readers also accept `meta`).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::meta::Meta;
use crate::types::Session;

pub const METHOD_CREATE: &str = "session/create";
pub const METHOD_RESUME: &str = "session/resume";
pub const METHOD_DELETE: &str = "session/delete";

/// Data key the create handler stores a label hint under.
pub const LABEL_DATA_KEY: &str = "label";

// ─────────────────────────────────────────────
// Params
// ─────────────────────────────────────────────

/// Optional hints a client may send with `session/create`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCreateHints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<HashMap<String, String>>,
}

impl SessionCreateHints {
    pub fn is_empty(&self) -> bool {
        self.label.is_none() && self.data.is_none()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCreateParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hints: Option<SessionCreateHints>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResumeParams {
    pub id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDeleteParams {
    pub id: String,
}

// ─────────────────────────────────────────────
// Results
// ─────────────────────────────────────────────

/// Result of `session/create` and `session/resume`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<HashMap<String, String>>,
    #[serde(rename = "_meta", alias = "meta", default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl SessionResult {
    /// Result body for `session`, carrying `meta`.
    pub fn new(session: &Session, meta: Meta) -> Self {
        Self {
            id: session.id.clone(),
            expiry: session.expiry.clone(),
            data: (!session.data.is_empty()).then(|| session.data.clone()),
            meta: Some(meta),
        }
    }
}

/// Result of `session/delete`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionDeleteResult {
    pub deleted: bool,
    #[serde(rename = "_meta", alias = "meta", default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::inject_into_meta;
    use serde_json::json;

    #[test]
    fn test_create_params_omit_empty_hints() {
        let params = SessionCreateParams::default();
        assert_eq!(serde_json::to_value(&params).unwrap(), json!({}));
    }

    #[test]
    fn test_create_params_parse() {
        let params: SessionCreateParams =
            serde_json::from_value(json!({"hints": {"label": "demo"}})).unwrap();
        let hints = params.hints.unwrap();
        assert_eq!(hints.label.as_deref(), Some("demo"));
        assert!(hints.data.is_none());
    }

    #[test]
    fn test_session_result_shape() {
        let session = Session::new("sess-1");
        let result = SessionResult::new(&session, inject_into_meta(Some(&session), None));
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"id": "sess-1", "_meta": {"mcp/session": {"id": "sess-1"}}})
        );
    }

    #[test]
    fn test_delete_result_accepts_meta_alias() {
        let result: SessionDeleteResult =
            serde_json::from_value(json!({"deleted": true, "meta": {"mcp/session": null}}))
                .unwrap();
        assert!(result.deleted);
        assert!(result.meta.is_some());
    }

    #[test]
    fn test_resume_params_require_id() {
        assert!(serde_json::from_value::<SessionResumeParams>(json!({})).is_err());
    }
}
