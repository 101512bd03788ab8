//! Core session types — the session record, its wire form, and feature names.
//!
//! A session is small server-held state: an opaque id, an optional absolute
//! expiry, and a string-to-string payload the protocol never interprets.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeDelta, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};

use crate::error::{Result, SessionError};

/// Default prefix for generated session ids.
pub const DEFAULT_ID_PREFIX: &str = "sess-";

/// Bytes of OS randomness behind every session id.
const SESSION_ID_BYTES: usize = 16;

/// `0001-01-01T00:00:00Z`, the earliest expiry that survives an RFC 3339 round trip.
const EARLIEST_EXPIRY_SECS: i64 = -62_135_596_800;

/// `9999-12-31T23:59:59Z`, the latest expiry that survives an RFC 3339 round trip.
const LATEST_EXPIRY_SECS: i64 = 253_402_300_799;

// ─────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────

/// A data-layer session.
///
/// `id` never changes once minted. `expiry` and `data` are only ever
/// replaced wholesale (see [`SessionStore::update`](crate::store::SessionStore::update)).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    /// RFC 3339 timestamp, UTC. `None` means the session never expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "HashMap::is_empty"
    )]
    pub data: HashMap<String, String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<HashMap<String, String>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl Session {
    /// Create a session with no expiry and no data.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            expiry: None,
            data: HashMap::new(),
        }
    }

    /// Builder: set an absolute expiry.
    pub fn with_expiry(mut self, expiry: DateTime<Utc>) -> Self {
        self.expiry = Some(format_expiry(expiry));
        self
    }

    /// Builder: replace the data payload.
    pub fn with_data(mut self, data: HashMap<String, String>) -> Self {
        self.data = data;
        self
    }

    /// Serialize to the wire object. Empty `expiry`/`data` are omitted.
    pub fn to_wire(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| json!({ "id": self.id }))
    }

    /// Parse a wire object, restoring defaults for missing optional fields.
    pub fn from_wire(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| SessionError::malformed("session", e))
    }

    /// Whether the session is expired at `now`.
    ///
    /// Sessions without an expiry never expire. A naive timestamp is read as
    /// UTC. An expiry that cannot be parsed is treated as not expired, so a
    /// formatting defect never destroys live state.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expiry.as_deref() {
            None => false,
            Some(raw) => match parse_expiry(raw) {
                Some(expiry) => now >= expiry,
                None => false,
            },
        }
    }
}

// ─────────────────────────────────────────────
// Ids and timestamps
// ─────────────────────────────────────────────

/// Generate an unguessable session id: `prefix` + 32 hex chars of OS randomness.
///
/// The prefix is cosmetic; uniqueness comes entirely from the random part.
pub fn generate_session_id(prefix: &str) -> String {
    let mut bytes = [0u8; SESSION_ID_BYTES];
    OsRng.fill_bytes(&mut bytes);
    format!("{prefix}{}", hex::encode(bytes))
}

/// Absolute expiry `ttl_seconds` from `now`. Zero or negative TTLs yield an
/// expiry at or before `now`, i.e. an already-expired session.
///
/// The result is clamped to years 0001..=9999 so that [`format_expiry`]
/// output always parses back.
pub fn expiry_after(now: DateTime<Utc>, ttl_seconds: i64) -> DateTime<Utc> {
    let earliest =
        DateTime::from_timestamp(EARLIEST_EXPIRY_SECS, 0).unwrap_or(DateTime::<Utc>::MIN_UTC);
    let latest =
        DateTime::from_timestamp(LATEST_EXPIRY_SECS, 0).unwrap_or(DateTime::<Utc>::MAX_UTC);
    let far = if ttl_seconds < 0 { earliest } else { latest };
    TimeDelta::try_seconds(ttl_seconds)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .unwrap_or(far)
        .clamp(earliest, latest)
}

/// Format an expiry as RFC 3339 with a `Z` suffix.
pub fn format_expiry(expiry: DateTime<Utc>) -> String {
    expiry.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse an expiry string. Accepts RFC 3339 with any offset, and naive
/// `YYYY-MM-DDTHH:MM:SS[.f]` (or space-separated) timestamps as UTC.
pub fn parse_expiry(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

// ─────────────────────────────────────────────
// Features
// ─────────────────────────────────────────────

/// Optional session operations a peer may implement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionFeature {
    Create,
    Resume,
    Delete,
}

impl SessionFeature {
    pub const ALL: [SessionFeature; 3] = [Self::Create, Self::Resume, Self::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Resume => "resume",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for SessionFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionFeature {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "create" => Ok(Self::Create),
            "resume" => Ok(Self::Resume),
            "delete" => Ok(Self::Delete),
            other => Err(SessionError::InvalidArgument(format!(
                "unknown session feature: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_generate_session_id_shape() {
        let id = generate_session_id("sess-");
        assert!(id.starts_with("sess-"));
        let hex_part = &id["sess-".len()..];
        assert_eq!(hex_part.len(), 32);
        assert!(hex_part.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_session_id_unique() {
        let a = generate_session_id("");
        let b = generate_session_id("");
        assert_ne!(a, b);
    }

    #[test]
    fn test_wire_omits_empty_fields() {
        let wire = Session::new("sess-1").to_wire();
        assert_eq!(wire, json!({"id": "sess-1"}));
    }

    #[test]
    fn test_wire_round_trip_full() {
        let mut data = HashMap::new();
        data.insert("label".to_string(), "demo".to_string());
        let session = Session::new("sess-2").with_expiry(at(60)).with_data(data);

        let back = Session::from_wire(session.to_wire()).unwrap();
        assert_eq!(back, session);
    }

    #[test]
    fn test_from_wire_defaults() {
        let session = Session::from_wire(json!({"id": "sess-3"})).unwrap();
        assert_eq!(session.expiry, None);
        assert!(session.data.is_empty());
    }

    #[test]
    fn test_from_wire_null_data_is_empty() {
        let session = Session::from_wire(json!({"id": "s", "data": null})).unwrap();
        assert!(session.data.is_empty());
        assert_eq!(session.to_wire(), json!({"id": "s"}));
    }

    #[test]
    fn test_from_wire_rejects_bad_shape() {
        assert!(Session::from_wire(json!({"expiry": "x"})).is_err());
        assert!(Session::from_wire(json!({"id": 7})).is_err());
        assert!(Session::from_wire(json!({"id": "s", "data": {"k": 1}})).is_err());
    }

    #[test]
    fn test_no_expiry_never_expires() {
        assert!(!Session::new("s").is_expired(DateTime::<Utc>::MAX_UTC));
    }

    #[test]
    fn test_expiry_comparison() {
        let session = Session::new("s").with_expiry(at(10));
        assert!(!session.is_expired(at(9)));
        assert!(session.is_expired(at(10)));
        assert!(session.is_expired(at(11)));
    }

    #[test]
    fn test_naive_expiry_is_utc() {
        let mut session = Session::new("s");
        session.expiry = Some("2023-11-14T22:13:30".to_string());
        let expiry = Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 30).unwrap();
        assert!(!session.is_expired(expiry - TimeDelta::seconds(1)));
        assert!(session.is_expired(expiry + TimeDelta::seconds(1)));
    }

    #[test]
    fn test_offset_expiry_normalized() {
        let mut session = Session::new("s");
        session.expiry = Some("2023-11-15T00:13:30+02:00".to_string());
        let expiry = Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 30).unwrap();
        assert!(!session.is_expired(expiry - TimeDelta::seconds(1)));
        assert!(session.is_expired(expiry));
    }

    #[test]
    fn test_malformed_expiry_fails_open() {
        let mut session = Session::new("s");
        session.expiry = Some("not a timestamp".to_string());
        assert!(!session.is_expired(DateTime::<Utc>::MAX_UTC));
    }

    #[test]
    fn test_expiry_after_non_positive_ttl() {
        let now = at(0);
        assert_eq!(expiry_after(now, 0), now);
        assert!(expiry_after(now, -5) < now);
    }

    #[test]
    fn test_expiry_after_clamps_to_rfc3339_range() {
        let earliest = Utc.with_ymd_and_hms(1, 1, 1, 0, 0, 0).unwrap();
        let latest = Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap();
        assert_eq!(expiry_after(at(0), i64::MAX), latest);
        assert_eq!(expiry_after(at(0), i64::MIN), earliest);
        assert_eq!(expiry_after(at(0), -1_000_000_000_000), earliest);
        assert_eq!(expiry_after(at(0), 1_000_000_000_000), latest);
    }

    #[test]
    fn test_extreme_ttl_expiry_round_trips() {
        for ttl in [i64::MIN, -1_000_000_000_000, 1_000_000_000_000, i64::MAX] {
            let expiry = expiry_after(at(0), ttl);
            assert_eq!(parse_expiry(&format_expiry(expiry)), Some(expiry), "ttl={ttl}");
        }

        let gone = Session::new("s").with_expiry(expiry_after(at(0), i64::MIN));
        assert!(gone.is_expired(at(0)));
        let kept = Session::new("s").with_expiry(expiry_after(at(0), i64::MAX));
        assert!(!kept.is_expired(at(0)));
    }

    #[test]
    fn test_format_expiry_is_utc_z() {
        let formatted = format_expiry(at(0));
        assert!(formatted.ends_with('Z'));
        assert_eq!(parse_expiry(&formatted), Some(at(0)));
    }

    #[test]
    fn test_feature_parse() {
        assert_eq!("resume".parse::<SessionFeature>().unwrap(), SessionFeature::Resume);
        assert!("rename".parse::<SessionFeature>().is_err());
        assert_eq!(SessionFeature::Delete.to_string(), "delete");
    }
}
