//! One-shot guardrail commands: `context`, `validate` and `tools`.
//!
//! Output is JSON on stdout, in the same shape the MCP tools return.

use anyhow::Result;
use catalyst_core::CatalystConfig;
use catalyst_mcp::ToolRegistry;

/// Print the schema context for `query`.
pub async fn context(config: &CatalystConfig, query: &str) -> Result<()> {
    let guardrail = super::build_guardrail(config).await?;
    let context = guardrail.get_query_context(query);
    println!("{}", serde_json::to_string_pretty(&context)?);
    Ok(())
}

/// Print the validation result for `sql` and return whether it passed.
pub async fn validate(config: &CatalystConfig, sql: &str) -> Result<bool> {
    let guardrail = super::build_guardrail(config).await?;
    let result = guardrail.validate_sql(sql);
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(result.valid)
}

/// Print the tool definitions served over MCP.
pub fn tools() -> Result<()> {
    let registry = ToolRegistry::guardrail();
    println!("{}", serde_json::to_string_pretty(&registry.list())?);
    Ok(())
}
