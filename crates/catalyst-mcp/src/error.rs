//! Error types for the MCP crate.

use thiserror::Error;

/// JSON-RPC error codes used by the server.
pub mod codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// Errors that can occur in the MCP server.
#[derive(Debug, Error)]
pub enum McpError {
    /// Failed to start the server.
    #[error("failed to start MCP server: {0}")]
    StartupFailed(String),

    /// Invalid request format.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Malformed `params` for a method.
    #[error("invalid params: {0}")]
    InvalidParams(String),

    /// Unknown JSON-RPC method.
    #[error("method not found: {0}")]
    MethodNotFound(String),

    /// Tool not found.
    #[error("tool not found: {name}")]
    ToolNotFound { name: String },

    /// Invalid arguments for tool.
    #[error("invalid arguments for tool {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },

    /// Transport error.
    #[error("transport error: {0}")]
    TransportError(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl McpError {
    /// JSON-RPC error code reported for this error.
    pub fn code(&self) -> i32 {
        match self {
            McpError::InvalidRequest(_) => codes::INVALID_REQUEST,
            McpError::MethodNotFound(_) => codes::METHOD_NOT_FOUND,
            McpError::InvalidParams(_)
            | McpError::ToolNotFound { .. }
            | McpError::InvalidArguments { .. } => codes::INVALID_PARAMS,
            McpError::SerializationError(_) => codes::PARSE_ERROR,
            McpError::StartupFailed(_)
            | McpError::TransportError(_)
            | McpError::IoError(_)
            | McpError::Internal(_) => codes::INTERNAL_ERROR,
        }
    }
}
