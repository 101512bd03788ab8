//! Configuration system — schema, loading, and env var overrides.
//!
//! # Usage
//! ```no_run
//! use mcp_sessions_core::config;
//!
//! let cfg = config::load_config(None);
//! println!("Default TTL: {}s", cfg.server.default_ttl_seconds);
//! ```

pub mod loader;
pub mod schema;

pub use loader::{get_config_path, load_config, save_config};
pub use schema::{ClientConfig, Config, ServerConfig};
