//! # catalyst-mcp
//!
//! MCP (Model Context Protocol) server exposing the Catalyst guardrail to AI
//! agents.
//!
//! ## Architecture
//!
//! ```text
//! AI Agent (SQL generator)
//!       │
//!       │ MCP protocol (list tools / call tool)
//!       ▼
//! ┌──────────────────────┐
//! │  Catalyst MCP Server │
//! │  get_query_context   │  ← allowlist + schema source
//! │  validate_sql        │  ← allowlist + lexical rules
//! └──────────────────────┘
//! ```
//!
//! The server never touches the database itself. It hands out schema context
//! and judges SQL; executing approved queries is the caller's job.
//!
//! Two transports are supported: newline-delimited JSON-RPC over stdio, and
//! HTTP (`POST /mcp`, `GET /health`).

pub mod error;
pub mod http_transport;
pub mod protocol;
pub mod server;
pub mod tools;

pub use error::McpError;
pub use http_transport::{HttpServer, create_router};
pub use protocol::{
    CallToolParams, CallToolResponse, JsonRpcRequest, JsonRpcResponse, ToolAnnotations,
    ToolContent, ToolDefinition,
};
pub use server::McpServer;
pub use tools::ToolRegistry;
