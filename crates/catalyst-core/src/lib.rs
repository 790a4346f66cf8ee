//! # catalyst-core
//!
//! Shared configuration types and table allowlist resolution for the Catalyst
//! query guardrail.
//!
//! The allowlist is the security boundary of the whole system: schema context
//! handed to SQL generators and the tables a query may reference are both
//! derived from it. It is resolved from an [`AllowlistSource`] on every call so
//! that operators can change it without restarting the server.

pub mod allowlist;
pub mod config;

pub use allowlist::{
    Allowlist, AllowlistSource, ConfiguredAllowlist, EnvAllowlist, FixedAllowlist,
    DEFAULT_ALLOWED_TABLES, DEFAULT_ALLOWLIST_ENV, resolve_allowlist,
};
pub use config::{
    CatalystConfig, ConfigError, GuardrailsConfig, McpConfig, ObservabilityConfig,
    SchemaSourceConfig, SchemaSourceKind, Transport,
};
