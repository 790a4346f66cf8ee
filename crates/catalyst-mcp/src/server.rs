//! MCP server implementation.
//!
//! This module provides the main MCP server that handles tool discovery
//! and dispatches tool calls to the guardrail.

use crate::error::{McpError, codes};
use crate::http_transport::HttpServer;
use crate::protocol::*;
use crate::tools::{self, ToolRegistry};
use catalyst_core::config::mcp::{McpConfig, Transport};
use catalyst_guardrail::Guardrail;
use serde::Serialize;
use serde_json::{Value, json};
use std::io::{BufRead, Write};
use std::sync::Arc;

/// The MCP server.
#[derive(Clone)]
pub struct McpServer {
    config: McpConfig,
    tools: ToolRegistry,
    guardrail: Arc<Guardrail>,
}

impl McpServer {
    /// Create a new MCP server serving the given guardrail.
    pub fn new(config: McpConfig, guardrail: Arc<Guardrail>) -> Self {
        Self {
            config,
            tools: ToolRegistry::guardrail(),
            guardrail,
        }
    }

    /// Get a reference to the tool registry.
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Get the server configuration.
    pub fn config(&self) -> &McpConfig {
        &self.config
    }

    /// Start the MCP server.
    pub async fn run(self) -> Result<(), McpError> {
        match self.config.transport {
            Transport::Stdio => {
                // Stdin reads block; keep them off the async workers.
                tokio::task::spawn_blocking(move || self.run_stdio())
                    .await
                    .map_err(|e| McpError::Internal(e.into()))?
            }
            Transport::Http => self.run_http().await,
        }
    }

    /// Run the server with stdio transport.
    fn run_stdio(&self) -> Result<(), McpError> {
        tracing::info!("Starting MCP server with stdio transport");

        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        self.serve_lines(stdin.lock(), stdout.lock())
    }

    /// Serve newline-delimited JSON-RPC from `reader`, writing responses to `writer`.
    ///
    /// Returns when `reader` reaches end of input.
    pub fn serve_lines<R: BufRead, W: Write>(&self, reader: R, mut writer: W) -> Result<(), McpError> {
        // Raw bytes, so a line that is not UTF-8 is a parse error rather than an I/O error.
        for line in reader.split(b'\n') {
            let line = line?;
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            let response = match serde_json::from_slice::<JsonRpcRequest>(&line) {
                Ok(request) => {
                    let notification = request.is_notification();
                    let response = self.handle_request(request);
                    if notification {
                        continue;
                    }
                    response
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding unparseable JSON-RPC message");
                    JsonRpcResponse::error(None, codes::PARSE_ERROR, format!("Parse error: {}", e))
                }
            };

            let response_json = serde_json::to_string(&response)?;
            writeln!(writer, "{}", response_json)?;
            writer.flush()?;
        }

        tracing::info!("stdin closed, MCP server exiting");
        Ok(())
    }

    /// Run the server with HTTP transport.
    pub async fn run_http(self) -> Result<(), McpError> {
        let addr = self.config.bind_addr();
        HttpServer::new(addr, Arc::new(self)).run().await
    }

    /// Handle a JSON-RPC request.
    pub fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.clone();

        if request.jsonrpc != "2.0" {
            return JsonRpcResponse::error(
                id,
                codes::INVALID_REQUEST,
                format!("Unsupported jsonrpc version: {}", request.jsonrpc),
            );
        }

        tracing::debug!(method = %request.method, "Handling MCP request");

        match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "initialized" | "notifications/initialized" => JsonRpcResponse::success(id, json!({})),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => self.handle_list_tools(id),
            "tools/call" => match self.handle_call_tool(request.params) {
                Ok(result) => JsonRpcResponse::success(id, result),
                Err(e) => {
                    tracing::warn!(error = %e, "Tool call failed");
                    JsonRpcResponse::error(id, e.code(), e.to_string())
                }
            },
            "shutdown" => self.handle_shutdown(id),
            _ => JsonRpcResponse::error(
                id,
                codes::METHOD_NOT_FOUND,
                McpError::MethodNotFound(request.method).to_string(),
            ),
        }
    }

    fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        let result = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "serverInfo": ServerInfo {
                name: "catalyst-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            "capabilities": {
                "tools": {
                    "listChanged": false
                }
            }
        });
        JsonRpcResponse::success(id, result)
    }

    fn handle_list_tools(&self, id: Option<Value>) -> JsonRpcResponse {
        let response = ListToolsResponse {
            tools: self.tools.list().into_iter().cloned().collect(),
        };
        match serde_json::to_value(response) {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(e) => JsonRpcResponse::error(id, codes::INTERNAL_ERROR, e.to_string()),
        }
    }

    /// Dispatch `tools/call`. Rejected SQL is a successful call with `valid: false`.
    fn handle_call_tool(&self, params: Option<Value>) -> Result<Value, McpError> {
        let params: CallToolParams = match params {
            Some(p) => serde_json::from_value(p)
                .map_err(|e| McpError::InvalidParams(e.to_string()))?,
            None => return Err(McpError::InvalidParams("missing params".to_string())),
        };

        if !self.tools.contains(&params.name) {
            return Err(McpError::ToolNotFound { name: params.name });
        }

        tracing::info!(tool = %params.name, "Calling tool");

        match params.name.as_str() {
            tools::GET_QUERY_CONTEXT => {
                let user_query =
                    tools::string_argument(tools::GET_QUERY_CONTEXT, &params.arguments, "user_query")?;
                tool_result(&self.guardrail.get_query_context(user_query))
            }
            tools::VALIDATE_SQL => {
                let sql = tools::string_argument(tools::VALIDATE_SQL, &params.arguments, "sql")?;
                tool_result(&self.guardrail.validate_sql(sql))
            }
            _ => Err(McpError::ToolNotFound { name: params.name }),
        }
    }

    fn handle_shutdown(&self, id: Option<Value>) -> JsonRpcResponse {
        tracing::info!("MCP server shutdown requested");
        JsonRpcResponse::success(id, json!(null))
    }
}

/// Wrap a tool's output as text content plus structured content.
fn tool_result<T: Serialize>(output: &T) -> Result<Value, McpError> {
    let structured = serde_json::to_value(output)?;
    let response = CallToolResponse {
        content: vec![ToolContent::Text {
            text: serde_json::to_string_pretty(&structured)?,
        }],
        structured_content: Some(structured),
        is_error: Some(false),
    };
    Ok(serde_json::to_value(response)?)
}
