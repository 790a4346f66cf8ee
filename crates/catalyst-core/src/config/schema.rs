//! Schema source configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where table schema metadata comes from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaSourceConfig {
    /// Source kind.
    #[serde(default)]
    pub source: SchemaSourceKind,

    /// Snapshot file (YAML or JSON) for the `file` source.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Environment variable holding the database URL for the `postgres` source.
    #[serde(default = "default_database_url_env")]
    pub database_url_env: String,
}

/// Schema source kind.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SchemaSourceKind {
    /// Illustrative catalog compiled into the binary.
    #[default]
    Builtin,
    /// Snapshot file loaded at startup.
    File,
    /// Introspected from Postgres at startup.
    Postgres,
}

impl Default for SchemaSourceConfig {
    fn default() -> Self {
        Self {
            source: SchemaSourceKind::default(),
            path: None,
            database_url_env: default_database_url_env(),
        }
    }
}

fn default_database_url_env() -> String {
    "DATABASE_URL".to_string()
}
