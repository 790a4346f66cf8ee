//! # catalyst-guardrail
//!
//! Query-safety guardrail between a natural-language-to-SQL pipeline and a
//! clinical database.
//!
//! Two operations:
//!
//! | Operation | Returns | Purpose |
//! |-----------|---------|---------|
//! | [`Guardrail::get_query_context`] | [`SchemaContext`] | Allowlisted schema for an SQL generator |
//! | [`Guardrail::validate_sql`] | [`ValidationResult`] | Classify candidate SQL before execution |
//!
//! Both are pure functions of their input plus the allowlist, which is
//! re-resolved on every call.
//!
//! ```
//! use catalyst_core::FixedAllowlist;
//! use catalyst_guardrail::{Guardrail, builtin_catalog};
//! use std::sync::Arc;
//!
//! let guardrail = Guardrail::new(Arc::new(FixedAllowlist::unset()), Arc::new(builtin_catalog()));
//!
//! let result = guardrail.validate_sql("SELECT id, name FROM test LIMIT 10");
//! assert!(result.valid);
//!
//! let result = guardrail.validate_sql("SELECT * FROM patient");
//! assert!(!result.valid);
//! ```
//!
//! This is a lexical filter, not a parser, and is meant as one layer of defense
//! rather than the only one.

pub mod catalog;
pub mod context;
pub mod error;
pub mod references;
pub mod schema;
pub mod validator;

pub use catalog::{BUILTIN_SCHEMA_NAME, builtin_catalog};
pub use context::{ContextTables, SchemaContext, SchemaContextBuilder};
pub use error::SchemaError;
pub use references::{TableReferences, extract_table_references};
pub use schema::{Column, DatabaseSchema, ForeignKey, SchemaSource, TableSchema};
pub use validator::{SqlGuardrail, ValidationResult, validate_with_allowlist};

use catalyst_core::{AllowlistSource, EnvAllowlist, GuardrailsConfig};
use std::sync::Arc;

/// Schema context builder and SQL validator sharing one allowlist source.
#[derive(Clone)]
pub struct Guardrail {
    context: SchemaContextBuilder,
    sql: SqlGuardrail,
}

impl Guardrail {
    pub fn new(allowlist: Arc<dyn AllowlistSource>, schema: Arc<dyn SchemaSource>) -> Self {
        Self {
            context: SchemaContextBuilder::new(allowlist.clone(), schema),
            sql: SqlGuardrail::new(allowlist),
        }
    }

    /// Build from the guardrails section of the configuration.
    pub fn from_config(config: &GuardrailsConfig, schema: Arc<dyn SchemaSource>) -> Self {
        let allowlist: Arc<dyn AllowlistSource> = Arc::new(config.allowlist_source());
        Self {
            context: SchemaContextBuilder::new(allowlist.clone(), schema)
                .with_schema_name(&config.schema_name),
            sql: SqlGuardrail::new(allowlist),
        }
    }

    pub fn get_query_context(&self, user_query: &str) -> SchemaContext {
        self.context.get_query_context(user_query)
    }

    pub fn validate_sql(&self, sql: &str) -> ValidationResult {
        self.sql.validate_sql(sql)
    }
}

impl Default for Guardrail {
    /// `MCP_ALLOWED_TABLES` allowlist over the built-in catalog.
    fn default() -> Self {
        Self::new(Arc::new(EnvAllowlist::default()), Arc::new(builtin_catalog()))
    }
}

/// [`Guardrail::get_query_context`] with the default environment allowlist and catalog.
pub fn get_query_context(user_query: &str) -> SchemaContext {
    Guardrail::default().get_query_context(user_query)
}

/// [`Guardrail::validate_sql`] with the default environment allowlist.
pub fn validate_sql(sql: &str) -> ValidationResult {
    SqlGuardrail::new(Arc::new(EnvAllowlist::default())).validate_sql(sql)
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalyst_core::FixedAllowlist;

    fn assert_matches_schema(instance: &serde_json::Value, schema_src: &str) {
        let schema: serde_json::Value = serde_json::from_str(schema_src).expect("schema must parse");
        let validator = jsonschema::draft202012::options()
            .build(&schema)
            .expect("schema must compile");

        if !validator.is_valid(instance) {
            let mut msgs = Vec::new();
            for (idx, err) in validator.iter_errors(instance).take(20).enumerate() {
                msgs.push(format!("{}: {}", idx + 1, err));
            }
            panic!("instance did not validate: {}", msgs.join("; "));
        }
    }

    fn guardrail() -> Guardrail {
        Guardrail::new(Arc::new(FixedAllowlist::unset()), Arc::new(builtin_catalog()))
    }

    #[test]
    fn schema_context_serialization_validates_against_schema() {
        let context = guardrail().get_query_context("find tests");
        let instance = serde_json::to_value(&context).expect("context must serialize");
        assert_matches_schema(
            &instance,
            include_str!("../../../schemas/SchemaContext.schema.json"),
        );
    }

    #[test]
    fn validation_result_serialization_validates_against_schema() {
        for sql in ["SELECT * FROM test LIMIT 10", "DELETE FROM patient"] {
            let result = guardrail().validate_sql(sql);
            let instance = serde_json::to_value(&result).expect("result must serialize");
            assert_matches_schema(
                &instance,
                include_str!("../../../schemas/ValidationResult.schema.json"),
            );
        }
    }

    #[test]
    fn from_config_uses_configured_tables_and_schema_name() {
        let config = GuardrailsConfig {
            allowed_tables_env: "CATALYST_TEST_GUARDRAIL_FROM_CONFIG".to_string(),
            allowed_tables: Some(vec!["panel".to_string(), "panel_item".to_string()]),
            schema_name: "lab".to_string(),
        };
        let guardrail = Guardrail::from_config(&config, Arc::new(builtin_catalog()));

        let context = guardrail.get_query_context("panels");
        assert_eq!(context.allowed_tables, vec!["panel", "panel_item"]);
        assert_eq!(context.notes[0], "All tables are in the lab schema");

        assert!(guardrail.validate_sql("SELECT id FROM panel LIMIT 1").valid);
        assert!(!guardrail.validate_sql("SELECT id FROM test LIMIT 1").valid);
    }
}
