//! MCP server configuration.
//!
//! This module defines configuration for the MCP (Model Context Protocol) server
//! that exposes the guardrail tools.

use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::env;

/// Environment variable overriding the HTTP bind host.
pub const HOST_ENV: &str = "MCP_HOST";

/// Environment variable overriding the HTTP bind port.
pub const PORT_ENV: &str = "MCP_PORT";

/// Configuration for the MCP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpConfig {
    /// Transport type: "stdio" or "http".
    #[serde(default)]
    pub transport: Transport,

    /// HTTP host (only used when transport is HTTP).
    #[serde(default = "default_http_host")]
    pub host: String,

    /// HTTP port (only used when transport is HTTP).
    #[serde(default = "default_http_port")]
    pub port: u16,
}

/// MCP transport type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// Standard input/output transport (for desktop agents, etc.).
    #[default]
    Stdio,
    /// HTTP transport.
    Http,
}

impl std::str::FromStr for Transport {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stdio" => Ok(Transport::Stdio),
            "http" => Ok(Transport::Http),
            other => Err(ConfigError::Config(format!(
                "unknown transport '{}', expected stdio or http",
                other
            ))),
        }
    }
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            transport: Transport::default(),
            host: default_http_host(),
            port: default_http_port(),
        }
    }
}

impl McpConfig {
    /// Check if using HTTP transport.
    pub fn is_http(&self) -> bool {
        self.transport == Transport::Http
    }

    /// Check if using stdio transport.
    pub fn is_stdio(&self) -> bool {
        self.transport == Transport::Stdio
    }

    /// Socket address string for the HTTP listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Apply `MCP_HOST` / `MCP_PORT` from the environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(host) = non_empty_env(HOST_ENV) {
            self.host = host;
        }
        if let Some(port) = non_empty_env(PORT_ENV) {
            self.port = port.parse().map_err(|_| {
                ConfigError::Config(format!("{} must be a port number, got '{}'", PORT_ENV, port))
            })?;
        }
        Ok(())
    }
}

fn non_empty_env(var: &str) -> Option<String> {
    env::var(var)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn default_http_host() -> String {
    "127.0.0.1".to_string()
}

fn default_http_port() -> u16 {
    8000
}
