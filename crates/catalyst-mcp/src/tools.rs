//! Tool registry and the guardrail tool definitions.
//!
//! The server exposes exactly two tools, both read-only:
//!
//! | Tool | Arguments | Result |
//! |------|-----------|--------|
//! | `get_query_context` | `user_query: string` | `SchemaContext` |
//! | `validate_sql` | `sql: string` | `ValidationResult` |

use crate::error::McpError;
use crate::protocol::{ToolAnnotations, ToolDefinition};
use serde_json::{Value, json};
use std::collections::BTreeMap;

pub const GET_QUERY_CONTEXT: &str = "get_query_context";
pub const VALIDATE_SQL: &str = "validate_sql";

/// Registry of available MCP tools.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, ToolDefinition>,
}

impl ToolRegistry {
    /// Create a new empty tool registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the guardrail tools.
    pub fn guardrail() -> Self {
        let mut registry = Self::new();
        registry.register(get_query_context_tool());
        registry.register(validate_sql_tool());
        registry
    }

    /// Register a tool.
    pub fn register(&mut self, tool: ToolDefinition) {
        self.tools.insert(tool.name.clone(), tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name)
    }

    /// Check if a tool exists.
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// List all tools, sorted by name.
    pub fn list(&self) -> Vec<&ToolDefinition> {
        self.tools.values().collect()
    }

    /// Get the number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Get tool names.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }
}

fn read_only_annotations(title: &str) -> ToolAnnotations {
    ToolAnnotations {
        title: Some(title.to_string()),
        read_only: Some(true),
        destructive: Some(false),
        idempotent: Some(true),
        open_world: Some(false),
    }
}

/// Definition of the `get_query_context` tool.
pub fn get_query_context_tool() -> ToolDefinition {
    ToolDefinition {
        name: GET_QUERY_CONTEXT.to_string(),
        description: Some(
            "Get the schema bundle (allowed tables, columns, primary and foreign keys) \
             to use when writing SQL for a user question. Only allowlisted tables are returned."
                .to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "user_query": {
                    "type": "string",
                    "description": "The natural-language question the SQL should answer"
                }
            },
            "required": ["user_query"],
            "additionalProperties": false
        }),
        annotations: Some(read_only_annotations("Get query context")),
    }
}

/// Definition of the `validate_sql` tool.
pub fn validate_sql_tool() -> ToolDefinition {
    ToolDefinition {
        name: VALIDATE_SQL.to_string(),
        description: Some(
            "Validate a SQL statement against the guardrails before execution. \
             Only SELECT/WITH statements over allowlisted tables are valid."
                .to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "sql": {
                    "type": "string",
                    "description": "The SQL statement to validate"
                }
            },
            "required": ["sql"],
            "additionalProperties": false
        }),
        annotations: Some(read_only_annotations("Validate SQL")),
    }
}

/// Extract a required string argument.
pub fn string_argument<'a>(tool: &str, arguments: &'a Value, field: &str) -> Result<&'a str, McpError> {
    match arguments.get(field) {
        Some(Value::String(value)) => Ok(value),
        Some(_) => Err(McpError::InvalidArguments {
            tool: tool.to_string(),
            reason: format!("'{}' must be a string", field),
        }),
        None => Err(McpError::InvalidArguments {
            tool: tool.to_string(),
            reason: format!("missing required argument '{}'", field),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guardrail_registry_has_exactly_two_tools() {
        let registry = ToolRegistry::guardrail();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec![GET_QUERY_CONTEXT, VALIDATE_SQL]);
        assert!(registry.contains(VALIDATE_SQL));
        assert!(registry.get("get_schema").is_none());
    }

    #[test]
    fn test_tools_are_annotated_read_only() {
        for tool in ToolRegistry::guardrail().list() {
            let annotations = tool.annotations.as_ref().unwrap();
            assert_eq!(annotations.read_only, Some(true));
            assert_eq!(annotations.destructive, Some(false));
        }
    }

    #[test]
    fn test_input_schemas_accept_and_reject_arguments() {
        let cases = [
            (get_query_context_tool(), json!({"user_query": "find tests"}), json!({"user_query": 3})),
            (validate_sql_tool(), json!({"sql": "SELECT 1"}), json!({})),
        ];
        for (tool, good, bad) in cases {
            let validator = jsonschema::draft202012::options()
                .build(&tool.input_schema)
                .expect("input schema must compile");
            assert!(validator.is_valid(&good), "{} should accept {}", tool.name, good);
            assert!(!validator.is_valid(&bad), "{} should reject {}", tool.name, bad);
        }
    }

    #[test]
    fn test_string_argument_errors() {
        let args = json!({"sql": 42});
        let err = string_argument(VALIDATE_SQL, &args, "sql").unwrap_err();
        assert!(err.to_string().contains("must be a string"));

        let err = string_argument(VALIDATE_SQL, &json!({}), "sql").unwrap_err();
        assert!(err.to_string().contains("missing required argument 'sql'"));

        assert_eq!(string_argument(VALIDATE_SQL, &json!({"sql": "x"}), "sql").unwrap(), "x");
    }
}
