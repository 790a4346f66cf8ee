//! Guardrail configuration.
//!
//! Controls where the table allowlist comes from and how schema context is
//! described to SQL generators.

use crate::allowlist::{ConfiguredAllowlist, DEFAULT_ALLOWLIST_ENV, EnvAllowlist};
use serde::{Deserialize, Serialize};

/// Configuration for the query guardrail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardrailsConfig {
    /// Environment variable holding a comma-separated allowlist override.
    /// Re-read on every request.
    #[serde(default = "default_allowed_tables_env")]
    pub allowed_tables_env: String,

    /// Allowlist used when the environment variable is unset or blank.
    #[serde(default)]
    pub allowed_tables: Option<Vec<String>>,

    /// Database schema the allowed tables live in.
    #[serde(default = "default_schema_name")]
    pub schema_name: String,
}

impl Default for GuardrailsConfig {
    fn default() -> Self {
        Self {
            allowed_tables_env: default_allowed_tables_env(),
            allowed_tables: None,
            schema_name: default_schema_name(),
        }
    }
}

impl GuardrailsConfig {
    /// Build the allowlist source described by this configuration.
    pub fn allowlist_source(&self) -> ConfiguredAllowlist {
        ConfiguredAllowlist::new(
            EnvAllowlist::new(&self.allowed_tables_env),
            self.allowed_tables.clone(),
        )
    }
}

fn default_allowed_tables_env() -> String {
    DEFAULT_ALLOWLIST_ENV.to_string()
}

fn default_schema_name() -> String {
    "clinlims".to_string()
}
