//! # catalyst-adapter-pg
//!
//! Captures a [`DatabaseSchema`] snapshot from a live Postgres catalog.
//!
//! Only allowlisted tables are read. The snapshot is taken once, before the
//! guardrail starts serving, and then used as a static [`SchemaSource`]. The
//! request path never touches the database.
//!
//! [`SchemaSource`]: catalyst_guardrail::SchemaSource

pub mod introspect;

pub use introspect::{IntrospectOptions, introspect_schema};
