//! CLI command implementations.
//!
//! Shared here: configuration loading and guardrail assembly, so that the
//! server and the one-shot commands see the same allowlist and schema source.

pub mod inspect;
pub mod serve;
pub mod snapshot;

use anyhow::{Context, Result};
use catalyst_adapter_pg::{IntrospectOptions, introspect_schema};
use catalyst_core::{Allowlist, CatalystConfig, SchemaSourceKind};
use catalyst_guardrail::{BUILTIN_SCHEMA_NAME, DatabaseSchema, Guardrail, SchemaSource, builtin_catalog};
use std::path::Path;
use std::sync::Arc;

/// A configuration plus whether it came from a file.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: CatalystConfig,
    pub found: bool,
}

/// Load the config file, or defaults when it does not exist.
pub fn load_config(path: &Path) -> Result<LoadedConfig> {
    if !path.exists() {
        return Ok(LoadedConfig {
            config: CatalystConfig::default(),
            found: false,
        });
    }

    let config = CatalystConfig::load_with_context(path)
        .with_context(|| format!("Failed to load configuration from {:?}", path))?;
    Ok(LoadedConfig {
        config,
        found: true,
    })
}

/// Build the guardrail described by `config`, loading its schema source.
pub async fn build_guardrail(config: &CatalystConfig) -> Result<Guardrail> {
    let schema = load_schema_source(config).await?;
    Ok(Guardrail::from_config(&config.guardrails, schema))
}

/// Resolve the configured schema source into a static snapshot.
pub async fn load_schema_source(config: &CatalystConfig) -> Result<Arc<dyn SchemaSource>> {
    match config.schema.source {
        SchemaSourceKind::Builtin => {
            if config.guardrails.schema_name != BUILTIN_SCHEMA_NAME {
                tracing::warn!(
                    schema_name = %config.guardrails.schema_name,
                    "Built-in catalog describes the {} schema", BUILTIN_SCHEMA_NAME
                );
            }
            Ok(Arc::new(builtin_catalog()))
        }
        SchemaSourceKind::File => {
            let path = config
                .schema
                .path
                .as_ref()
                .context("schema.path is required when schema.source is 'file'")?;
            let schema = DatabaseSchema::from_file(path)
                .with_context(|| format!("Failed to load schema snapshot from {:?}", path))?;
            tracing::info!(path = %path.display(), tables = schema.tables.len(), "Loaded schema snapshot");
            Ok(Arc::new(schema))
        }
        SchemaSourceKind::Postgres => Ok(Arc::new(introspect_configured(config).await?)),
    }
}

/// Introspect the allowlisted tables from the configured database.
pub async fn introspect_configured(config: &CatalystConfig) -> Result<DatabaseSchema> {
    let database_url = database_url(config)?;
    let allowlist = Allowlist::resolve(&config.guardrails.allowlist_source());
    introspect_schema(
        &database_url,
        &config.guardrails.schema_name,
        &allowlist,
        IntrospectOptions::default(),
    )
    .await
}

fn database_url(config: &CatalystConfig) -> Result<String> {
    let var = &config.schema.database_url_env;
    std::env::var(var)
        .ok()
        .filter(|url| !url.trim().is_empty())
        .with_context(|| format!("Environment variable {} must hold the database URL", var))
}
