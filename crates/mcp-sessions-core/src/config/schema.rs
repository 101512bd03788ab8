//! Configuration schema.
//!
//! Hierarchy: `Config` → `ServerConfig`, `ClientConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::types::{SessionFeature, DEFAULT_ID_PREFIX};

/// Default session lifetime.
pub const DEFAULT_TTL_SECONDS: i64 = 3600;

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration — loaded from `~/.mcp-sessions/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub server: ServerConfig,
    pub client: ClientConfig,
}

// ─────────────────────────────────────────────
// Server
// ─────────────────────────────────────────────

/// Server-side session settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    /// Optional features advertised to clients.
    pub features: Vec<String>,
    /// Lifetime of sessions created without an explicit TTL.
    pub default_ttl_seconds: i64,
    /// Cosmetic prefix for generated session ids.
    pub id_prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            features: default_features(),
            default_ttl_seconds: DEFAULT_TTL_SECONDS,
            id_prefix: DEFAULT_ID_PREFIX.to_string(),
        }
    }
}

impl ServerConfig {
    /// Parsed feature list. Unknown names are skipped with a warning.
    pub fn session_features(&self) -> Vec<SessionFeature> {
        parse_features(&self.features)
    }
}

// ─────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────

/// Client-side session settings.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
    /// Optional features the client advertises. Usually empty: the client
    /// only needs to say it understands sessions.
    pub features: Vec<String>,
}

impl ClientConfig {
    pub fn session_features(&self) -> Vec<SessionFeature> {
        parse_features(&self.features)
    }
}

fn default_features() -> Vec<String> {
    SessionFeature::ALL
        .iter()
        .map(|f| f.as_str().to_string())
        .collect()
}

fn parse_features(names: &[String]) -> Vec<SessionFeature> {
    names
        .iter()
        .filter_map(|name| match name.parse() {
            Ok(feature) => Some(feature),
            Err(_) => {
                warn!(feature = %name, "ignoring unknown session feature in config");
                None
            }
        })
        .collect()
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
