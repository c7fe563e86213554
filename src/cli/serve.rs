//! HTTP API server command

use super::helpers::build_service;
use reposcore_core::{
    api::{ApiServer, ApiServerConfig},
    config::Settings,
};
use std::net::SocketAddr;
use tracing::debug;

/// Handle server startup command
pub async fn handle(mut settings: Settings, addr: Option<String>) -> anyhow::Result<()> {
    let addr = addr.unwrap_or_else(|| settings.server.addr.clone());
    let socket_addr: SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address '{}': {}", addr, e))?;

    debug!("Starting HTTP API server...");
    let evaluator = build_service(&mut settings).await?;

    ApiServer::new(ApiServerConfig { addr: socket_addr }, evaluator)
        .serve()
        .await
}
