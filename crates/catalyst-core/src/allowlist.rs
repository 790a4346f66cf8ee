//! Table allowlist resolution.
//!
//! An allowlist is read from an [`AllowlistSource`] as a comma-separated list of
//! table names. When the source is unset, empty, or unreadable, resolution falls
//! back to [`DEFAULT_ALLOWED_TABLES`], a minimal profile of terminology and test
//! catalog tables that carry no patient data.
//!
//! Nothing here caches: each [`Allowlist::resolve`] re-reads its source.

use std::collections::HashSet;
use std::env::{self, VarError};

/// Environment variable holding the allowlist override.
pub const DEFAULT_ALLOWLIST_ENV: &str = "MCP_ALLOWED_TABLES";

/// Default non-PHI profile (terminology + test catalog + statuses).
pub const DEFAULT_ALLOWED_TABLES: [&str; 12] = [
    "test",
    "test_section",
    "analyte",
    "method",
    "panel",
    "panel_item",
    "type_of_sample",
    "type_of_test_result",
    "unit_of_measure",
    "dictionary",
    "dictionary_category",
    "status_of_sample",
];

/// Where the raw allowlist value comes from.
pub trait AllowlistSource: Send + Sync {
    /// Read the raw comma-separated value, or `None` when it is not set.
    fn read(&self) -> Option<String>;
}

/// Reads the allowlist from an environment variable on every call.
#[derive(Debug, Clone)]
pub struct EnvAllowlist {
    var: String,
}

impl EnvAllowlist {
    /// Create a source reading the given variable.
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    /// Name of the variable this source reads.
    pub fn var(&self) -> &str {
        &self.var
    }
}

impl Default for EnvAllowlist {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWLIST_ENV)
    }
}

impl AllowlistSource for EnvAllowlist {
    fn read(&self) -> Option<String> {
        match env::var(&self.var) {
            Ok(value) => Some(value),
            Err(VarError::NotPresent) => None,
            Err(VarError::NotUnicode(_)) => {
                tracing::warn!(
                    var = %self.var,
                    "allowlist variable is not valid UTF-8, falling back to default tables"
                );
                None
            }
        }
    }
}

/// A fixed raw value. Mostly useful in tests and for embedding.
#[derive(Debug, Clone, Default)]
pub struct FixedAllowlist(Option<String>);

impl FixedAllowlist {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(Some(raw.into()))
    }

    /// A source that is never set, so resolution always yields the default.
    pub fn unset() -> Self {
        Self(None)
    }
}

impl AllowlistSource for FixedAllowlist {
    fn read(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Environment variable first, then the list from the config file.
#[derive(Debug, Clone)]
pub struct ConfiguredAllowlist {
    env: EnvAllowlist,
    configured: Option<String>,
}

impl ConfiguredAllowlist {
    pub fn new(env: EnvAllowlist, configured: Option<Vec<String>>) -> Self {
        Self {
            env,
            configured: configured.map(|tables| tables.join(",")),
        }
    }
}

impl AllowlistSource for ConfiguredAllowlist {
    fn read(&self) -> Option<String> {
        self.env
            .read()
            .filter(|value| !value.trim().is_empty())
            .or_else(|| self.configured.clone())
    }
}

/// A resolved allowlist: ordered, trimmed, unique under case-insensitive comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allowlist {
    tables: Vec<String>,
    folded: HashSet<String>,
}

impl Allowlist {
    /// Resolve the allowlist from a source, falling back to the default.
    pub fn resolve(source: &dyn AllowlistSource) -> Self {
        match source.read().as_deref().and_then(Self::parse) {
            Some(allowlist) => allowlist,
            None => {
                tracing::debug!("no allowlist configured, using default tables");
                Self::default_tables()
            }
        }
    }

    /// The built-in default profile.
    pub fn default_tables() -> Self {
        Self::from_names(DEFAULT_ALLOWED_TABLES.iter().copied())
    }

    /// Parse a comma-separated list. Returns `None` when no entry survives trimming.
    pub fn parse(raw: &str) -> Option<Self> {
        let allowlist = Self::from_names(
            raw.split(',')
                .map(str::trim)
                .filter(|entry| !entry.is_empty()),
        );
        (!allowlist.is_empty()).then_some(allowlist)
    }

    fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut tables = Vec::new();
        let mut folded = HashSet::new();
        for name in names {
            // First spelling wins for case-insensitive duplicates.
            if folded.insert(name.to_lowercase()) {
                tables.push(name.to_string());
            }
        }
        Self { tables, folded }
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, table: &str) -> bool {
        self.folded.contains(&table.to_lowercase())
    }

    /// Table names in configured order.
    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.tables
    }
}

/// Resolve the allowlist into a plain list of table names.
pub fn resolve_allowlist(source: &dyn AllowlistSource) -> Vec<String> {
    Allowlist::resolve(source).into_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_source_yields_default() {
        let tables = resolve_allowlist(&FixedAllowlist::unset());
        assert_eq!(tables.len(), 12);
        assert_eq!(tables[0], "test");
        assert_eq!(tables[11], "status_of_sample");
    }

    #[test]
    fn test_blank_value_yields_default() {
        let tables = resolve_allowlist(&FixedAllowlist::new("  , ,  "));
        assert_eq!(tables, DEFAULT_ALLOWED_TABLES.to_vec());
    }

    #[test]
    fn test_entries_are_trimmed_and_empties_dropped() {
        let tables = resolve_allowlist(&FixedAllowlist::new(" test , ,analyte,"));
        assert_eq!(tables, vec!["test", "analyte"]);
    }

    #[test]
    fn test_case_insensitive_duplicates_keep_first_spelling() {
        let tables = resolve_allowlist(&FixedAllowlist::new("Test,analyte,TEST"));
        assert_eq!(tables, vec!["Test", "analyte"]);
    }

    #[test]
    fn test_contains_ignores_case() {
        let allowlist = Allowlist::resolve(&FixedAllowlist::new("Test_Section"));
        assert!(allowlist.contains("test_section"));
        assert!(allowlist.contains("TEST_SECTION"));
        assert!(!allowlist.contains("patient"));
    }

    #[test]
    fn test_env_source_is_reread_each_call() {
        let var = "CATALYST_TEST_ALLOWLIST_REREAD";
        let source = EnvAllowlist::new(var);

        // SAFETY: the variable name is unique to this test.
        unsafe {
            env::set_var(var, "panel");
        }
        assert_eq!(resolve_allowlist(&source), vec!["panel"]);

        unsafe {
            env::set_var(var, "panel,method");
        }
        assert_eq!(resolve_allowlist(&source), vec!["panel", "method"]);

        unsafe {
            env::remove_var(var);
        }
        assert_eq!(resolve_allowlist(&source).len(), 12);
    }

    #[test]
    fn test_configured_list_used_when_env_unset() {
        let source = ConfiguredAllowlist::new(
            EnvAllowlist::new("CATALYST_TEST_ALLOWLIST_UNSET"),
            Some(vec!["analyte".to_string(), "method".to_string()]),
        );
        assert_eq!(resolve_allowlist(&source), vec!["analyte", "method"]);
    }

    #[test]
    fn test_env_overrides_configured_list() {
        let var = "CATALYST_TEST_ALLOWLIST_OVERRIDE";
        // SAFETY: the variable name is unique to this test.
        unsafe {
            env::set_var(var, "dictionary");
        }
        let source = ConfiguredAllowlist::new(
            EnvAllowlist::new(var),
            Some(vec!["analyte".to_string()]),
        );
        assert_eq!(resolve_allowlist(&source), vec!["dictionary"]);
        unsafe {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_blank_env_falls_through_to_configured_list() {
        let var = "CATALYST_TEST_ALLOWLIST_BLANK";
        // SAFETY: the variable name is unique to this test.
        unsafe {
            env::set_var(var, "   ");
        }
        let source = ConfiguredAllowlist::new(
            EnvAllowlist::new(var),
            Some(vec!["panel_item".to_string()]),
        );
        assert_eq!(resolve_allowlist(&source), vec!["panel_item"]);
        unsafe {
            env::remove_var(var);
        }
    }
}
