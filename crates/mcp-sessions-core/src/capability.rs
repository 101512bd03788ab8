//! Capability descriptor — advertising session support during the handshake.
//!
//! Session support lives under the `session` key of a peer's `experimental`
//! capabilities. The key's presence alone means "sessions supported"; the
//! optional `features` list says which optional operations the peer implements.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::SessionFeature;

/// Key inside `experimental` capabilities that marks session support.
pub const SESSION_CAPABILITY_KEY: &str = "session";

/// A peer's `experimental` capabilities map.
pub type ExperimentalCapabilities = HashMap<String, Value>;

/// The object stored under [`SESSION_CAPABILITY_KEY`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCapability {
    /// Feature names as sent on the wire. Unknown names are kept but ignored
    /// by [`supports`](Self::supports).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
}

impl SessionCapability {
    /// Build a descriptor from a feature list.
    pub fn new(features: &[SessionFeature]) -> Self {
        Self {
            features: features.iter().map(|f| f.as_str().to_string()).collect(),
        }
    }

    /// Whether `feature` is declared.
    pub fn supports(&self, feature: SessionFeature) -> bool {
        self.features.iter().any(|f| f == feature.as_str())
    }

    /// Declared features this implementation understands.
    pub fn known_features(&self) -> Vec<SessionFeature> {
        self.features.iter().filter_map(|f| f.parse().ok()).collect()
    }

    /// Wrap into an `experimental` capabilities map.
    pub fn to_experimental(&self) -> ExperimentalCapabilities {
        let mut experimental = ExperimentalCapabilities::new();
        // A struct holding a Vec<String> always serializes.
        let value = serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Default::default()));
        experimental.insert(SESSION_CAPABILITY_KEY.to_string(), value);
        experimental
    }
}

/// Build the capability advertisement. An empty feature list still marks
/// session support, just without optional features.
pub fn capability_descriptor(features: &[SessionFeature]) -> ExperimentalCapabilities {
    SessionCapability::new(features).to_experimental()
}

/// Find the session capability in a peer's `experimental` map.
///
/// Returns `None` when the peer did not advertise it (or sent `null`). A
/// `features` value of the wrong shape degrades to "no optional features".
pub fn extract_capability(
    experimental: Option<&ExperimentalCapabilities>,
) -> Option<SessionCapability> {
    let value = experimental?.get(SESSION_CAPABILITY_KEY)?;
    if value.is_null() {
        return None;
    }
    let features = value
        .get("features")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    Some(SessionCapability { features })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_descriptor_with_features() {
        let caps = capability_descriptor(&SessionFeature::ALL);
        assert_eq!(
            caps.get(SESSION_CAPABILITY_KEY),
            Some(&json!({"features": ["create", "resume", "delete"]}))
        );
    }

    #[test]
    fn test_descriptor_without_features_still_present() {
        let caps = capability_descriptor(&[]);
        assert_eq!(caps.get(SESSION_CAPABILITY_KEY), Some(&json!({})));
        let cap = extract_capability(Some(&caps)).unwrap();
        assert!(cap.features.is_empty());
    }

    #[test]
    fn test_extract_absent() {
        assert_eq!(extract_capability(None), None);
        let mut caps = ExperimentalCapabilities::new();
        caps.insert("other".into(), json!({}));
        assert_eq!(extract_capability(Some(&caps)), None);
        caps.insert(SESSION_CAPABILITY_KEY.into(), Value::Null);
        assert_eq!(extract_capability(Some(&caps)), None);
    }

    #[test]
    fn test_extract_ignores_unknown_features() {
        let mut caps = ExperimentalCapabilities::new();
        caps.insert(
            SESSION_CAPABILITY_KEY.into(),
            json!({"features": ["resume", "teleport", 3]}),
        );
        let cap = extract_capability(Some(&caps)).unwrap();
        assert!(cap.supports(SessionFeature::Resume));
        assert!(!cap.supports(SessionFeature::Create));
        assert_eq!(cap.known_features(), vec![SessionFeature::Resume]);
    }

    #[test]
    fn test_extract_bad_features_shape() {
        let mut caps = ExperimentalCapabilities::new();
        caps.insert(SESSION_CAPABILITY_KEY.into(), json!({"features": "create"}));
        let cap = extract_capability(Some(&caps)).unwrap();
        assert!(cap.features.is_empty());
    }
}
