//! SQL guardrail validation.
//!
//! Classifies candidate SQL as safe to execute or not. Every check runs on
//! every input and contributes to one [`ValidationResult`]; a rejected query is
//! a normal outcome, never an error.
//!
//! Checks, in order:
//! 1. blocked DDL/DML keywords, matched as substrings of the upper-cased SQL
//! 2. statement shape: must start with `SELECT` or `WITH`
//! 3. table reference extraction (see [`crate::references`])
//! 4. allowlist membership of every referenced table
//! 5. advisory warnings for unbounded results and `SELECT *`
//!
//! The keyword check does not tokenize. A column named
//! `update_log` trips it.

use crate::references::extract_table_references;
use catalyst_core::{Allowlist, AllowlistSource};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Statement keywords that reject a query wherever they appear.
pub const BLOCKED_KEYWORDS: [&str; 7] = [
    "DROP", "DELETE", "TRUNCATE", "ALTER", "CREATE", "INSERT", "UPDATE",
];

pub const BLOCKED_OPERATION_ERROR: &str = "Query contains blocked operations (DDL/DML not allowed)";
pub const STATEMENT_SHAPE_ERROR: &str = "Query must start with SELECT or WITH (CTE)";
pub const MISSING_LIMIT_WARNING: &str = "Query missing LIMIT clause - may return large result set";
pub const SELECT_STAR_WARNING: &str = "Query uses SELECT * - consider specifying columns explicitly";

/// Outcome of validating one SQL string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationResult {
    /// True iff `errors` is empty.
    pub valid: bool,
    /// Blocking reasons.
    pub errors: Vec<String>,
    /// Advisory findings; never affect `valid`.
    pub warnings: Vec<String>,
    /// Every table found in FROM/JOIN, including disallowed ones.
    pub referenced_tables: Vec<String>,
}

/// Validates SQL against the current allowlist.
#[derive(Clone)]
pub struct SqlGuardrail {
    allowlist: Arc<dyn AllowlistSource>,
}

impl SqlGuardrail {
    pub fn new(allowlist: Arc<dyn AllowlistSource>) -> Self {
        Self { allowlist }
    }

    /// Validate `sql`. The allowlist is resolved afresh for each call.
    pub fn validate_sql(&self, sql: &str) -> ValidationResult {
        let allowlist = Allowlist::resolve(self.allowlist.as_ref());
        validate_with_allowlist(sql, &allowlist)
    }
}

/// Validate `sql` against an already resolved allowlist.
pub fn validate_with_allowlist(sql: &str, allowlist: &Allowlist) -> ValidationResult {
    let upper = sql.to_uppercase();
    let trimmed = upper.trim();
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let blocked: Vec<&str> = BLOCKED_KEYWORDS
        .iter()
        .copied()
        .filter(|keyword| trimmed.contains(keyword))
        .collect();
    if !blocked.is_empty() {
        tracing::debug!(keywords = ?blocked, "SQL contains blocked keywords");
        errors.push(BLOCKED_OPERATION_ERROR.to_string());
    }

    if !(trimmed.starts_with("SELECT") || trimmed.starts_with("WITH")) {
        errors.push(STATEMENT_SHAPE_ERROR.to_string());
    }

    let references = extract_table_references(sql);

    let disallowed: Vec<String> = references
        .tables
        .iter()
        .filter(|table| !allowlist.contains(table))
        .cloned()
        .collect();
    if !disallowed.is_empty() {
        errors.push(format!(
            "Query references non-allowed tables: {}",
            disallowed.join(", ")
        ));
    }

    if !trimmed.contains("LIMIT") && !trimmed.contains("FETCH") {
        warnings.push(MISSING_LIMIT_WARNING.to_string());
    }
    if trimmed.contains("SELECT *") {
        warnings.push(SELECT_STAR_WARNING.to_string());
    }

    let result = ValidationResult {
        valid: errors.is_empty(),
        errors,
        warnings,
        referenced_tables: references.tables,
    };

    // SQL text may carry patient identifiers in literals; log only the shape.
    if result.valid {
        tracing::debug!(
            tables = ?result.referenced_tables,
            warnings = result.warnings.len(),
            "SQL accepted"
        );
    } else {
        tracing::info!(
            tables = ?result.referenced_tables,
            disallowed = ?disallowed,
            errors = result.errors.len(),
            "SQL rejected"
        );
    }

    result
}
