//! Built-in illustrative catalog for the clinlims reference tables.
//!
//! Used until a snapshot file or live catalog is configured. Tables not listed
//! here resolve to [`TableSchema::placeholder`] in the context builder.

use crate::schema::{Column, DatabaseSchema, ForeignKey, TableSchema};

/// Schema name the built-in catalog describes.
pub const BUILTIN_SCHEMA_NAME: &str = "clinlims";

/// Build the built-in catalog.
pub fn builtin_catalog() -> DatabaseSchema {
    let mut schema = DatabaseSchema::new();
    schema.schema = Some(BUILTIN_SCHEMA_NAME.to_string());

    schema.add_table(
        "test",
        TableSchema::new(vec![
            id(),
            Column::new("name", "character varying", false),
            Column::new("description", "character varying", false),
            is_active(),
            Column::new("test_section_id", "numeric(10,0)", true),
            lastupdated(),
        ])
        .with_primary_key(["id"])
        .with_foreign_key(ForeignKey::new("test_section_id", "test_section", "id")),
    );

    schema.add_table(
        "test_section",
        TableSchema::new(vec![
            id(),
            Column::new("name", "character varying", true),
            Column::new("description", "character varying", true),
            is_active(),
            lastupdated(),
        ])
        .with_primary_key(["id"]),
    );

    schema.add_table(
        "dictionary",
        TableSchema::new(vec![
            id(),
            Column::new("dict_entry", "character varying(4000)", true),
            is_active(),
            Column::new("dictionary_category_id", "numeric(10,0)", true),
            lastupdated(),
        ])
        .with_primary_key(["id"])
        .with_foreign_key(ForeignKey::new(
            "dictionary_category_id",
            "dictionary_category",
            "id",
        )),
    );

    schema.add_table(
        "dictionary_category",
        TableSchema::new(vec![
            id(),
            Column::new("name", "character varying(50)", true),
            Column::new("description", "character varying(60)", true),
            lastupdated(),
        ])
        .with_primary_key(["id"]),
    );

    schema.add_table(
        "status_of_sample",
        TableSchema::new(vec![
            id(),
            Column::new("name", "character varying", true),
            Column::new("description", "character varying", true),
            Column::new("code", "character varying", true),
            is_active(),
            lastupdated(),
        ])
        .with_primary_key(["id"]),
    );

    schema
}

fn id() -> Column {
    Column::new("id", "numeric(10,0)", false)
}

fn is_active() -> Column {
    Column::new("is_active", "character varying(1)", true)
}

fn lastupdated() -> Column {
    Column::new("lastupdated", "timestamp(6)", true)
}
