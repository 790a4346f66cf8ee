//! Lexical table reference extraction.
//!
//! This is pattern matching, not parsing. It finds identifiers following `FROM`
//! and `JOIN`, minus names introduced as `WITH <name> AS`. Quoted identifiers and
//! schema-qualified names are not understood: `clinlims.test` yields `clinlims`,
//! which then fails the allowlist check. Only the first CTE of a `WITH` clause is
//! recognised, so later CTEs in a comma-separated list are treated as tables.
//!
//! The `regex` crate matches in time linear in the input, so no input can make
//! scanning quadratic.

use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use std::sync::LazyLock;

static CTE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bWITH\s+([a-z_][a-z0-9_]*)\s+AS").expect("valid CTE pattern")
});

static FROM_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bFROM\s+([a-z_][a-z0-9_]*)").expect("valid FROM pattern")
});

static JOIN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bJOIN\s+([a-z_][a-z0-9_]*)").expect("valid JOIN pattern")
});

/// Tables and CTE names found in a SQL string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableReferences {
    /// Lower-cased tables from FROM/JOIN, deduplicated, FROM matches first.
    pub tables: Vec<String>,

    /// Lower-cased CTE names.
    pub cte_names: BTreeSet<String>,
}

/// Extract table names referenced in FROM/JOIN clauses, plus CTE names.
pub fn extract_table_references(sql: &str) -> TableReferences {
    // CTE names first so they are never mistaken for tables.
    let cte_names: BTreeSet<String> = CTE_PATTERN
        .captures_iter(sql)
        .map(|caps| caps[1].to_lowercase())
        .collect();

    let mut tables = Vec::new();
    let mut seen = HashSet::new();
    for pattern in [&*FROM_PATTERN, &*JOIN_PATTERN] {
        for caps in pattern.captures_iter(sql) {
            let table = caps[1].to_lowercase();
            if !cte_names.contains(&table) && seen.insert(table.clone()) {
                tables.push(table);
            }
        }
    }

    TableReferences { tables, cte_names }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_simple_from() {
        let refs = extract_table_references("SELECT id FROM test LIMIT 5");
        assert_eq!(refs.tables, vec!["test"]);
        assert!(refs.cte_names.is_empty());
    }

    #[test]
    fn test_joins_are_collected_after_from() {
        let refs = extract_table_references(
            "select t.name, s.name from test t join test_section s on t.test_section_id = s.id \
             left join analyte a on a.id = t.id",
        );
        assert_eq!(refs.tables, vec!["test", "test_section", "analyte"]);
    }

    #[test]
    fn test_names_are_lowercased_and_deduplicated() {
        let refs = extract_table_references(
            "SELECT * FROM Test JOIN TEST_SECTION ON 1=1 WHERE id IN (SELECT id FROM test)",
        );
        assert_eq!(refs.tables, vec!["test", "test_section"]);
    }

    #[test]
    fn test_cte_names_excluded_from_tables() {
        let refs = extract_table_references(
            "WITH recent AS (SELECT * FROM test LIMIT 5) SELECT * FROM recent JOIN panel ON true",
        );
        assert_eq!(refs.tables, vec!["test", "panel"]);
        assert_eq!(refs.cte_names, BTreeSet::from(["recent".to_string()]));
    }

    #[test]
    fn test_cte_name_matched_case_insensitively() {
        let refs = extract_table_references("with Counts as (select * from method) select * from COUNTS");
        assert_eq!(refs.tables, vec!["method"]);
        assert!(refs.cte_names.contains("counts"));
    }

    #[test]
    fn test_schema_qualified_name_yields_schema_part() {
        let refs = extract_table_references("SELECT * FROM clinlims.test");
        assert_eq!(refs.tables, vec!["clinlims"]);
    }

    #[test]
    fn test_quoted_identifier_not_matched() {
        let refs = extract_table_references(r#"SELECT * FROM "patient""#);
        assert!(refs.tables.is_empty());
    }

    #[test]
    fn test_keyword_inside_identifier_not_matched() {
        // `\b` keeps `datefrom` from reading as `FROM`.
        let refs = extract_table_references("SELECT datefrom test FROM panel");
        assert_eq!(refs.tables, vec!["panel"]);
    }

    #[test]
    fn test_identifier_may_start_with_underscore() {
        let refs = extract_table_references("SELECT * FROM _staging_2");
        assert_eq!(refs.tables, vec!["_staging_2"]);
    }

    #[test]
    fn test_no_references() {
        let refs = extract_table_references("SELECT 1");
        assert_eq!(refs, TableReferences::default());
    }

    #[test]
    fn test_long_input_scans() {
        let sql = format!("SELECT * FROM test WHERE name IN ({})", "'x',".repeat(200_000));
        let refs = extract_table_references(&sql);
        assert_eq!(refs.tables, vec!["test"]);
    }
}
