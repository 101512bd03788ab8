//! Config loader — reads `~/.mcp-sessions/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.mcp-sessions/config.json`
//! 3. Environment variables `MCP_SESSIONS_<SECTION>__<FIELD>` (override JSON)

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::Config;

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default path + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    apply_env_overrides(load_config_from_path(&config_path))
}

/// Load config from a specific file path, without env overrides.
fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Config::default();
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return Config::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to parse config {}: {}", path.display(), e);
            Config::default()
        }
    }
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config).map_err(std::io::Error::other)?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Supported overrides:
/// - `MCP_SESSIONS_SERVER__FEATURES` → `server.features` (comma-separated)
/// - `MCP_SESSIONS_SERVER__DEFAULT_TTL_SECONDS` → `server.default_ttl_seconds`
/// - `MCP_SESSIONS_SERVER__ID_PREFIX` → `server.id_prefix`
/// - `MCP_SESSIONS_CLIENT__FEATURES` → `client.features` (comma-separated)
fn apply_env_overrides(config: Config) -> Config {
    apply_overrides(config, |key| std::env::var(key).ok())
}

fn apply_overrides(mut config: Config, var: impl Fn(&str) -> Option<String>) -> Config {
    if let Some(val) = var("MCP_SESSIONS_SERVER__FEATURES") {
        config.server.features = split_list(&val);
    }
    if let Some(val) = var("MCP_SESSIONS_SERVER__DEFAULT_TTL_SECONDS") {
        match val.trim().parse::<i64>() {
            Ok(ttl) => config.server.default_ttl_seconds = ttl,
            Err(e) => warn!(value = %val, error = %e, "ignoring invalid default TTL override"),
        }
    }
    if let Some(val) = var("MCP_SESSIONS_SERVER__ID_PREFIX") {
        config.server.id_prefix = val;
    }
    if let Some(val) = var("MCP_SESSIONS_CLIENT__FEATURES") {
        config.client.features = split_list(&val);
    }

    config
}

fn split_list(val: &str) -> Vec<String> {
    val.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp_json(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_load_missing_file() {
        let config = load_config_from_path(Path::new("/nonexistent/path/config.json"));
        assert_eq!(config.server.default_ttl_seconds, 3600);
    }

    #[test]
    fn test_load_valid_json() {
        let file = write_temp_json(
            r#"{
            "server": {
                "defaultTtlSeconds": 90,
                "features": ["create", "delete"]
            }
        }"#,
        );

        let config = load_config_from_path(file.path());
        assert_eq!(config.server.default_ttl_seconds, 90);
        assert_eq!(config.server.features, vec!["create", "delete"]);
        // Default preserved
        assert_eq!(config.server.id_prefix, "sess-");
    }

    #[test]
    fn test_load_invalid_json_returns_defaults() {
        let file = write_temp_json("not valid json {{{");
        let config = load_config_from_path(file.path());
        assert_eq!(config.server.default_ttl_seconds, 3600);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::default();
        config.server.id_prefix = "app-".to_string();
        config.client.features = vec!["resume".to_string()];

        save_config(&config, Some(&path)).unwrap();

        let reloaded = load_config_from_path(&path);
        assert_eq!(reloaded.server.id_prefix, "app-");
        assert_eq!(reloaded.client.features, vec!["resume"]);
    }

    #[test]
    fn test_saved_json_uses_camel_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        save_config(&Config::default(), Some(&path)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let raw: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert!(raw["server"].get("idPrefix").is_some());
        assert!(raw["server"].get("id_prefix").is_none());
    }

    #[test]
    fn test_override_ttl_and_prefix() {
        let config = apply_overrides(
            Config::default(),
            env(&[
                ("MCP_SESSIONS_SERVER__DEFAULT_TTL_SECONDS", "15"),
                ("MCP_SESSIONS_SERVER__ID_PREFIX", "t-"),
            ]),
        );
        assert_eq!(config.server.default_ttl_seconds, 15);
        assert_eq!(config.server.id_prefix, "t-");
    }

    #[test]
    fn test_override_invalid_ttl_ignored() {
        let config = apply_overrides(
            Config::default(),
            env(&[("MCP_SESSIONS_SERVER__DEFAULT_TTL_SECONDS", "soon")]),
        );
        assert_eq!(config.server.default_ttl_seconds, 3600);
    }

    #[test]
    fn test_override_feature_lists() {
        let config = apply_overrides(
            Config::default(),
            env(&[
                ("MCP_SESSIONS_SERVER__FEATURES", "resume, delete"),
                ("MCP_SESSIONS_CLIENT__FEATURES", ""),
            ]),
        );
        assert_eq!(config.server.features, vec!["resume", "delete"]);
        assert!(config.client.features.is_empty());
    }

    #[test]
    fn test_no_overrides_keeps_file_values() {
        let mut base = Config::default();
        base.server.default_ttl_seconds = 42;
        let config = apply_overrides(base, env(&[]));
        assert_eq!(config.server.default_ttl_seconds, 42);
    }
}
