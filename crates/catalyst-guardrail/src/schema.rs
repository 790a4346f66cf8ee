//! Schema types handed to SQL generators.
//!
//! Schema metadata is read-only reference data. It reaches the context builder
//! through the [`SchemaSource`] trait so that a static catalog, a snapshot file,
//! or a live catalog lookup can be swapped without touching consumers.

use crate::error::SchemaError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Looks up schema metadata for a table.
pub trait SchemaSource: Send + Sync {
    /// Return the schema for `table`, or `None` when the source has no data for it.
    fn lookup(&self, table: &str) -> Option<TableSchema>;
}

impl<F> SchemaSource for F
where
    F: Fn(&str) -> Option<TableSchema> + Send + Sync,
{
    fn lookup(&self, table: &str) -> Option<TableSchema> {
        self(table)
    }
}

/// A set of table schemas, as captured from a catalog or written by hand.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DatabaseSchema {
    /// Database schema name (e.g., "clinlims").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Tables keyed by name.
    #[serde(default)]
    pub tables: BTreeMap<String, TableSchema>,
}

impl DatabaseSchema {
    /// Create a new empty database schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table to the schema.
    pub fn add_table(&mut self, name: impl Into<String>, table: TableSchema) {
        self.tables.insert(name.into(), table);
    }

    /// Get a table by name, ignoring case.
    pub fn get_table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.get(name).or_else(|| {
            let folded = name.to_lowercase();
            self.tables
                .iter()
                .find(|(key, _)| key.to_lowercase() == folded)
                .map(|(_, table)| table)
        })
    }

    /// Load a snapshot from a YAML or JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Parse a snapshot. JSON is accepted as well, being a subset of YAML.
    pub fn from_yaml(content: &str) -> Result<Self, SchemaError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Render the snapshot as YAML.
    pub fn to_yaml(&self) -> Result<String, SchemaError> {
        serde_yaml::to_string(self).map_err(|e| SchemaError::Serialize(e.to_string()))
    }
}

impl SchemaSource for DatabaseSchema {
    fn lookup(&self, table: &str) -> Option<TableSchema> {
        self.get_table(table).cloned()
    }
}

/// Schema information for a database table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableSchema {
    /// Columns in declaration order.
    pub columns: Vec<Column>,

    /// Primary key columns, in key order.
    #[serde(default)]
    pub primary_key: Vec<String>,

    /// Foreign key relationships.
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKey>,
}

impl TableSchema {
    /// Create a table schema from its columns, with no keys.
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            primary_key: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    /// Set the primary key columns.
    pub fn with_primary_key<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Add a foreign key.
    pub fn with_foreign_key(mut self, fk: ForeignKey) -> Self {
        self.foreign_keys.push(fk);
        self
    }

    /// Stand-in for an allowlisted table the schema source knows nothing about.
    ///
    /// Only an `id` key and a `lastupdated` column; neither is authoritative.
    pub fn placeholder() -> Self {
        Self::new(vec![
            Column::new("id", "numeric(10,0)", false),
            Column::new("lastupdated", "timestamp(6)", true),
        ])
        .with_primary_key(["id"])
    }

    /// Get a column by name.
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Schema information for a database column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Column {
    /// Column name.
    pub name: String,

    /// Declared SQL type, as the catalog reports it.
    #[serde(rename = "type")]
    pub declared_type: String,

    /// Whether the column is nullable.
    pub nullable: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>, nullable: bool) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            nullable,
        }
    }
}

/// Foreign key relationship from one column to another table's column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ForeignKey {
    /// Local column.
    pub column: String,

    /// Referenced table.
    #[serde(rename = "ref_table")]
    pub referenced_table: String,

    /// Referenced column.
    #[serde(rename = "ref_column")]
    pub referenced_column: String,
}

impl ForeignKey {
    pub fn new(
        column: impl Into<String>,
        referenced_table: impl Into<String>,
        referenced_column: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            referenced_table: referenced_table.into(),
            referenced_column: referenced_column.into(),
        }
    }
}
