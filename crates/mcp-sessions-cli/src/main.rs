//! mcp-sessions CLI — entry point.
//!
//! # Commands
//!
//! - `mcp-sessions demo [--label LABEL] [--logs]` — in-process client/server round trip
//! - `mcp-sessions config [--path PATH]` — print the effective configuration
//! - `mcp-sessions capabilities` — print the server's capability advertisement

mod demo;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use mcp_sessions_core::config::load_config;
use mcp_sessions_server::SessionServer;

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Data-layer sessions for MCP: negotiate, create, resume, revoke.
#[derive(Parser)]
#[command(name = "mcp-sessions", version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.mcp-sessions/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a create → request → delete round trip between an in-process client and server
    Demo {
        /// Label hint sent with session/create
        #[arg(short, long, default_value = "demo")]
        label: String,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Print the effective configuration (file + env overrides)
    Config,

    /// Print the experimental capabilities the server advertises
    Capabilities,
}

impl Commands {
    fn verbose(&self) -> bool {
        matches!(self, Commands::Demo { logs: true, .. })
    }
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.command.verbose());
    let config = load_config(cli.config.as_deref());

    match cli.command {
        Commands::Demo { label, .. } => demo::run(&config, &label).await,
        Commands::Config => {
            let json = serde_json::to_string_pretty(&config).context("failed to render config")?;
            println!("{json}");
            Ok(())
        }
        Commands::Capabilities => {
            let server = SessionServer::from_config(&config.server);
            let json = serde_json::to_string_pretty(&server.advertised_capabilities())
                .context("failed to render capabilities")?;
            println!("{json}");
            Ok(())
        }
    }
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("mcp_sessions=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_demo_logs_is_verbose() {
        let cli = Cli::parse_from(["mcp-sessions", "demo", "--logs"]);
        assert!(cli.command.verbose());
        let cli = Cli::parse_from(["mcp-sessions", "demo"]);
        assert!(!cli.command.verbose());
        let cli = Cli::parse_from(["mcp-sessions", "config"]);
        assert!(!cli.command.verbose());
    }
}
