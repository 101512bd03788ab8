//! `mcp-sessions demo` — both peers in one process, wired through the
//! handler registry the way an RPC layer would wire them.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::info;

use mcp_sessions_client::SessionClient;
use mcp_sessions_core::config::Config;
use mcp_sessions_core::protocol::{METHOD_CREATE, METHOD_DELETE, METHOD_RESUME};
use mcp_sessions_core::SessionFeature;
use mcp_sessions_server::{register_session_handlers, HandlerRegistry, OwnerFn, SessionServer};

pub async fn run(config: &Config, label: &str) -> Result<()> {
    let server = Arc::new(SessionServer::from_config(&config.server));
    let owner: OwnerFn = Arc::new(|| Some("demo-user".to_string()));
    let mut registry = HandlerRegistry::new();
    register_session_handlers(&mut registry, server.clone(), Some(owner));

    let client = SessionClient::from_config(&config.client);

    // Handshake
    if !client.negotiate(Some(&server.advertised_capabilities())) {
        bail!("server does not advertise session support");
    }
    println!("negotiated: server supports sessions");

    if !client.supports(SessionFeature::Create) {
        bail!("server does not implement session/create");
    }

    // Create
    let params = serde_json::to_value(client.build_create_request(Some(label), None))?;
    let result = registry
        .dispatch(METHOD_CREATE, params)
        .await
        .context("session/create failed")?;
    let session = client.process_create_or_resume_result(&result)?;
    println!("created:   {}", session.to_wire());

    // An ordinary request carries the session in _meta
    let meta = client.prepare_request_meta(None);
    let resolved = server.extract_request_session(Some(&meta));
    info!(resolved = resolved.is_some(), "server resolved request session");
    println!(
        "request:   server resolved {}",
        resolved.map(|s| s.id).unwrap_or_else(|| "no session".to_string())
    );

    // Resume
    if client.supports(SessionFeature::Resume) {
        let params = serde_json::to_value(client.build_resume_request(&session.id))?;
        let result = registry
            .dispatch(METHOD_RESUME, params)
            .await
            .context("session/resume failed")?;
        let resumed = client.process_create_or_resume_result(&result)?;
        println!("resumed:   {}", resumed.id);
    }

    // Delete
    if client.supports(SessionFeature::Delete) {
        let params = serde_json::to_value(client.build_delete_request(None)?)?;
        let result = registry
            .dispatch(METHOD_DELETE, params)
            .await
            .context("session/delete failed")?;
        let deleted = client.process_delete_result(&result)?;
        println!(
            "deleted:   {deleted} (client session: {})",
            client.session().map(|s| s.id).unwrap_or_else(|| "cleared".to_string())
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_demo_runs_with_defaults() {
        run(&Config::default(), "test").await.unwrap();
    }

    #[tokio::test]
    async fn test_demo_fails_without_create() {
        let mut config = Config::default();
        config.server.features = vec!["resume".to_string()];
        let err = run(&config, "test").await.unwrap_err();
        assert!(err.to_string().contains("session/create"));
    }

    #[tokio::test]
    async fn test_demo_without_optional_steps() {
        let mut config = Config::default();
        config.server.features = vec!["create".to_string()];
        run(&config, "test").await.unwrap();
    }
}
