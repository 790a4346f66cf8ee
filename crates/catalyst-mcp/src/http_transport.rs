//! HTTP transport for MCP server.
//!
//! JSON-RPC requests are posted to `/mcp`, one message per request body.
//! `/health` reports liveness.

use crate::error::{McpError, codes};
use crate::protocol::{JsonRpcRequest, JsonRpcResponse};
use crate::server::McpServer;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Create the HTTP router for MCP.
pub fn create_router(server: Arc<McpServer>) -> Router {
    Router::new()
        .route("/mcp", post(handle_mcp_post))
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .with_state(server)
}

/// Handle POST requests to /mcp (JSON-RPC over HTTP).
async fn handle_mcp_post(State(server): State<Arc<McpServer>>, body: String) -> Response {
    let request: JsonRpcRequest = match serde_json::from_str(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(error = %e, "Rejecting unparseable JSON-RPC body");
            let response =
                JsonRpcResponse::error(None, codes::PARSE_ERROR, format!("Parse error: {}", e));
            return (StatusCode::OK, Json(response)).into_response();
        }
    };

    let notification = request.is_notification();
    let response = server.handle_request(request);
    if notification {
        return StatusCode::ACCEPTED.into_response();
    }

    (StatusCode::OK, Json(response)).into_response()
}

/// Handle health check requests.
async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "catalyst-mcp",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// HTTP server for MCP transport.
pub struct HttpServer {
    addr: String,
    server: Arc<McpServer>,
}

impl HttpServer {
    /// Create a new HTTP server.
    pub fn new(addr: impl Into<String>, server: Arc<McpServer>) -> Self {
        Self {
            addr: addr.into(),
            server,
        }
    }

    /// Run the HTTP server until Ctrl-C.
    pub async fn run(self) -> Result<(), McpError> {
        let app = create_router(self.server);

        let listener = tokio::net::TcpListener::bind(self.addr.as_str())
            .await
            .map_err(|e| McpError::StartupFailed(format!("Failed to bind to {}: {}", self.addr, e)))?;

        tracing::info!(addr = %self.addr, "MCP HTTP server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| McpError::TransportError(e.to_string()))?;

        tracing::info!("MCP HTTP server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use catalyst_core::FixedAllowlist;
    use catalyst_core::config::mcp::McpConfig;
    use catalyst_guardrail::{Guardrail, builtin_catalog};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn app() -> Router {
        let guardrail = Guardrail::new(Arc::new(FixedAllowlist::unset()), Arc::new(builtin_catalog()));
        create_router(Arc::new(McpServer::new(McpConfig::default(), Arc::new(guardrail))))
    }

    fn post_mcp(body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/mcp")
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.into())
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_validate_sql_over_http() {
        let request = json!({
            "jsonrpc": "2.0",
            "id": "abc",
            "method": "tools/call",
            "params": {"name": "validate_sql", "arguments": {"sql": "SELECT id FROM test LIMIT 5"}}
        });
        let response = app().oneshot(post_mcp(request.to_string())).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["id"], "abc");
        assert_eq!(body["result"]["structuredContent"]["valid"], true);
        assert_eq!(
            body["result"]["structuredContent"]["referenced_tables"],
            json!(["test"])
        );
    }

    #[tokio::test]
    async fn test_notification_is_accepted_without_body() {
        let request = json!({"jsonrpc": "2.0", "method": "notifications/initialized"});
        let response = app().oneshot(post_mcp(request.to_string())).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_returns_parse_error() {
        let response = app().oneshot(post_mcp("{not json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], codes::PARSE_ERROR);
        assert_eq!(body["id"], Value::Null);
    }
}
