//! `catalyst serve`: run the MCP server.

use anyhow::{Context, Result};
use catalyst_core::{CatalystConfig, Transport};
use catalyst_mcp::McpServer;
use std::sync::Arc;
use tracing::info;

pub async fn run(
    mut config: CatalystConfig,
    transport: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    // Precedence: flags, then MCP_HOST/MCP_PORT, then the config file.
    config
        .mcp
        .apply_env_overrides()
        .context("Invalid MCP environment overrides")?;
    if let Some(transport) = transport {
        config.mcp.transport = transport.parse::<Transport>()?;
    }
    if let Some(port) = port {
        config.mcp.port = port;
    }

    let guardrail = super::build_guardrail(&config).await?;

    info!(
        transport = ?config.mcp.transport,
        allowlist_env = %config.guardrails.allowed_tables_env,
        schema_source = ?config.schema.source,
        "Starting Catalyst MCP server"
    );
    if config.mcp.is_http() {
        info!(addr = %config.mcp.bind_addr(), "HTTP transport selected");
    }

    let server = McpServer::new(config.mcp, Arc::new(guardrail));
    server.run().await?;
    Ok(())
}
