//! Configuration types for the Catalyst query guardrail.
//!
//! Configuration is loaded from a single YAML file (`catalyst.yaml` by default).
//! Every section is optional; a missing file section falls back to defaults that
//! expose only the built-in non-PHI table profile.
//!
//! # Example
//!
//! ```yaml
//! guardrails:
//!   allowed_tables_env: MCP_ALLOWED_TABLES
//!   allowed_tables: [test, test_section, analyte]
//!   schema_name: clinlims
//! schema:
//!   source: file
//!   path: schema.yaml
//! mcp:
//!   transport: http
//!   port: 8000
//! observability:
//!   log_level: debug
//! ```

pub mod guardrails;
pub mod mcp;
pub mod schema;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub use guardrails::GuardrailsConfig;
pub use mcp::{McpConfig, Transport};
pub use schema::{SchemaSourceConfig, SchemaSourceKind};

/// Complete Catalyst configuration loaded from a file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CatalystConfig {
    /// Project name.
    #[serde(default)]
    pub project: Option<String>,

    /// Allowlist and schema naming.
    #[serde(default)]
    pub guardrails: GuardrailsConfig,

    /// Where table metadata comes from.
    #[serde(default)]
    pub schema: SchemaSourceConfig,

    /// MCP server configuration.
    #[serde(default)]
    pub mcp: McpConfig,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ObservabilityConfig {
    /// Default log filter when `RUST_LOG` is not set (e.g. "info", "catalyst_mcp=debug").
    #[serde(default)]
    pub log_level: Option<String>,
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CatalystConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration and resolve paths relative to the config file.
    pub fn load_with_context(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut config = Self::from_file(path)?;

        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        config.schema.path = config.schema.path.take().map(|snapshot| {
            if snapshot.is_relative() {
                base_dir.join(snapshot)
            } else {
                snapshot
            }
        });

        Ok(config)
    }

    /// Check cross-field requirements serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.schema.source == SchemaSourceKind::File && self.schema.path.is_none() {
            return Err(ConfigError::Config(
                "schema.path is required when schema.source is 'file'".to_string(),
            ));
        }
        if self.guardrails.allowed_tables_env.trim().is_empty() {
            return Err(ConfigError::Config(
                "guardrails.allowed_tables_env must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = CatalystConfig::from_yaml("{}").unwrap();
        assert_eq!(config.guardrails.allowed_tables_env, "MCP_ALLOWED_TABLES");
        assert_eq!(config.guardrails.schema_name, "clinlims");
        assert!(config.guardrails.allowed_tables.is_none());
        assert_eq!(config.schema.source, SchemaSourceKind::Builtin);
        assert!(config.mcp.is_stdio());
        assert_eq!(config.mcp.port, 8000);
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
project: catalyst
guardrails:
  allowed_tables_env: LAB_TABLES
  allowed_tables: [test, analyte]
  schema_name: lab
schema:
  source: postgres
  database_url_env: LAB_DB_URL
mcp:
  transport: http
  host: 0.0.0.0
  port: 9100
observability:
  log_level: debug
"#;
        let config = CatalystConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.project.as_deref(), Some("catalyst"));
        assert_eq!(config.guardrails.allowed_tables_env, "LAB_TABLES");
        assert_eq!(
            config.guardrails.allowed_tables,
            Some(vec!["test".to_string(), "analyte".to_string()])
        );
        assert_eq!(config.schema.source, SchemaSourceKind::Postgres);
        assert_eq!(config.schema.database_url_env, "LAB_DB_URL");
        assert!(config.mcp.is_http());
        assert_eq!(config.mcp.bind_addr(), "0.0.0.0:9100");
        assert_eq!(config.observability.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_file_source_requires_path() {
        let err = CatalystConfig::from_yaml("schema:\n  source: file\n").unwrap_err();
        assert!(matches!(err, ConfigError::Config(_)));
    }

    #[test]
    fn test_unknown_transport_rejected() {
        let err = CatalystConfig::from_yaml("mcp:\n  transport: carrier-pigeon\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn test_load_with_context_resolves_snapshot_path() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("catalyst.yaml");
        let mut file = fs::File::create(&config_path).unwrap();
        writeln!(file, "schema:\n  source: file\n  path: snapshots/schema.yaml").unwrap();

        let config = CatalystConfig::load_with_context(&config_path).unwrap();
        assert_eq!(
            config.schema.path,
            Some(dir.path().join("snapshots/schema.yaml"))
        );
    }

    #[test]
    fn test_transport_from_str() {
        assert_eq!("HTTP".parse::<Transport>().unwrap(), Transport::Http);
        assert_eq!("stdio".parse::<Transport>().unwrap(), Transport::Stdio);
        assert!("grpc".parse::<Transport>().is_err());
    }
}
