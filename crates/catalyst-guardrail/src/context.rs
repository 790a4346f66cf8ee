//! Allowlisted schema context for SQL generators.
//!
//! The allowlist, not the schema source, is the security boundary: every
//! allowlisted table gets an entry (a placeholder if the source has no data) and
//! nothing outside the allowlist is ever returned.

use crate::catalog::BUILTIN_SCHEMA_NAME;
use crate::schema::{SchemaSource, TableSchema};
use catalyst_core::{Allowlist, AllowlistSource};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Index;
use std::sync::Arc;

/// Schema bundle returned for a user query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SchemaContext {
    /// The resolved allowlist, in configured order.
    pub allowed_tables: Vec<String>,
    /// Schema for each allowed table, in allowlist order.
    pub tables: ContextTables,
    /// Guidance for the SQL generator.
    pub notes: Vec<String>,
}

/// Table schemas keyed by name, kept in insertion order.
///
/// Serializes as a JSON object whose keys follow the allowlist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextTables {
    entries: Vec<(String, TableSchema)>,
}

impl ContextTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for `name`, keeping its first position.
    pub fn insert(&mut self, name: impl Into<String>, table: TableSchema) {
        let name = name.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = table,
            None => self.entries.push((name, table)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&TableSchema> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, table)| table)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &TableSchema)> {
        self.entries.iter().map(|(key, table)| (key, table))
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.iter().map(|(key, _)| key)
    }

    pub fn values(&self) -> impl Iterator<Item = &TableSchema> {
        self.entries.iter().map(|(_, table)| table)
    }
}

impl Index<&str> for ContextTables {
    type Output = TableSchema;

    fn index(&self, name: &str) -> &TableSchema {
        match self.get(name) {
            Some(table) => table,
            None => panic!("no table named '{}' in context", name),
        }
    }
}

impl Serialize for ContextTables {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, table) in &self.entries {
            map.serialize_entry(name, table)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ContextTables {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TablesVisitor;

        impl<'de> Visitor<'de> for TablesVisitor {
            type Value = ContextTables;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of table name to table schema")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<ContextTables, A::Error> {
                let mut tables = ContextTables::new();
                while let Some((name, table)) = access.next_entry::<String, TableSchema>()? {
                    tables.insert(name, table);
                }
                Ok(tables)
            }
        }

        deserializer.deserialize_map(TablesVisitor)
    }
}

/// Builds [`SchemaContext`] from an allowlist and a schema source.
#[derive(Clone)]
pub struct SchemaContextBuilder {
    allowlist: Arc<dyn AllowlistSource>,
    schema: Arc<dyn SchemaSource>,
    schema_name: String,
}

impl SchemaContextBuilder {
    pub fn new(allowlist: Arc<dyn AllowlistSource>, schema: Arc<dyn SchemaSource>) -> Self {
        Self {
            allowlist,
            schema,
            schema_name: BUILTIN_SCHEMA_NAME.to_string(),
        }
    }

    /// Set the schema name mentioned in the notes.
    pub fn with_schema_name(mut self, schema_name: impl Into<String>) -> Self {
        self.schema_name = schema_name.into();
        self
    }

    /// Build the schema context.
    ///
    /// `user_query` is accepted for future relevance filtering; every allowed
    /// table is returned regardless of it.
    pub fn get_query_context(&self, user_query: &str) -> SchemaContext {
        let allowlist = Allowlist::resolve(self.allowlist.as_ref());

        let mut tables = ContextTables::new();
        let mut placeholders = 0usize;
        for name in allowlist.iter() {
            let table = self.schema.lookup(name).unwrap_or_else(|| {
                placeholders += 1;
                TableSchema::placeholder()
            });
            tables.insert(name.to_string(), table);
        }

        tracing::debug!(
            query_len = user_query.len(),
            tables = tables.len(),
            placeholders,
            "built schema context"
        );

        SchemaContext {
            allowed_tables: allowlist.into_vec(),
            tables,
            notes: vec![
                format!("All tables are in the {} schema", self.schema_name),
                "Use table aliases for clarity in complex queries".to_string(),
            ],
        }
    }
}
