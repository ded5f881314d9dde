//! MCP dispatch and the stdio transport.
//!
//! One message in, at most one message out: notifications produce no
//! response, everything else produces exactly one. Tool failures are
//! carried inside a successful `tools/call` response (`isError: true`);
//! the JSON-RPC error member is reserved for protocol-level faults.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use slackline_tools::ToolRegistry;

use crate::protocol::{
    InitializeResult, JsonRpcRequest, JsonRpcResponse, ServerCapabilities, ServerInfo,
    ToolCallParams, ToolResult, ToolsCapability, INVALID_PARAMS, METHOD_NOT_FOUND, PARSE_ERROR,
};

/// MCP protocol revision this server speaks.
const PROTOCOL_VERSION: &str = "2024-11-05";

/// Transport-independent MCP server: both transports feed raw message
/// strings through [`McpServer::handle_message`].
pub struct McpServer {
    registry: Arc<ToolRegistry>,
}

impl McpServer {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    /// Handle one raw JSON-RPC message. Returns the serialized response,
    /// or `None` when the message was a notification.
    pub async fn handle_message(&self, message: &str) -> Option<String> {
        let request: JsonRpcRequest = match serde_json::from_str(message) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "unparseable message");
                return render(JsonRpcResponse::error(
                    None,
                    PARSE_ERROR,
                    format!("Parse error: {e}"),
                ));
            }
        };

        // Notifications get no response, whatever the method.
        if request.id.is_none() {
            debug!(method = %request.method, "notification");
            return None;
        }

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(request.id),
            "ping" => JsonRpcResponse::success(request.id, serde_json::json!({})),
            "tools/list" => self.handle_tools_list(request.id),
            "tools/call" => self.handle_tools_call(request.id, request.params).await,
            other => JsonRpcResponse::error(
                request.id,
                METHOD_NOT_FOUND,
                format!("Method not found: {other}"),
            ),
        };
        render(response)
    }

    fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: ToolsCapability {
                    list_changed: false,
                },
            },
            server_info: ServerInfo {
                name: "slackline".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };
        match serde_json::to_value(result) {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => JsonRpcResponse::error(id, INVALID_PARAMS, e.to_string()),
        }
    }

    fn handle_tools_list(&self, id: Option<Value>) -> JsonRpcResponse {
        let tools = self.registry.definitions();
        match serde_json::to_value(tools) {
            Ok(value) => JsonRpcResponse::success(id, serde_json::json!({ "tools": value })),
            Err(e) => JsonRpcResponse::error(id, INVALID_PARAMS, e.to_string()),
        }
    }

    async fn handle_tools_call(&self, id: Option<Value>, params: Value) -> JsonRpcResponse {
        let call: ToolCallParams = match serde_json::from_value(params) {
            Ok(call) => call,
            Err(e) => {
                return JsonRpcResponse::error(id, INVALID_PARAMS, format!("Invalid params: {e}"))
            }
        };

        let arguments: HashMap<String, Value> = match call.arguments {
            Value::Null => HashMap::new(),
            Value::Object(map) => map.into_iter().collect(),
            _ => {
                return JsonRpcResponse::error(
                    id,
                    INVALID_PARAMS,
                    "Invalid params: 'arguments' must be an object".to_string(),
                )
            }
        };

        debug!(tool = %call.name, "dispatching tool call");
        let result = match self.registry.execute(&call.name, arguments).await {
            Ok(output) => ToolResult::text(output),
            Err(e) => ToolResult::error(e.to_string()),
        };
        match serde_json::to_value(result) {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => JsonRpcResponse::error(id, INVALID_PARAMS, e.to_string()),
        }
    }
}

fn render(response: JsonRpcResponse) -> Option<String> {
    match serde_json::to_string(&response) {
        Ok(s) => Some(s),
        Err(e) => {
            // Response types only hold serializable data, so this is
            // unreachable in practice; drop the message rather than
            // write garbage to the transport.
            warn!(error = %e, "failed to serialize response");
            None
        }
    }
}

/// Serve MCP over stdin/stdout, one JSON message per line. All
/// diagnostics go to stderr; stdout carries protocol traffic only.
pub async fn run_stdio(server: McpServer) -> anyhow::Result<()> {
    let stdin = tokio::io::stdin();
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(stdin).lines();

    info!("mcp server ready on stdio");

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        if let Some(response) = server.handle_message(&line).await {
            stdout.write_all(response.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }
    }

    info!("stdin closed, shutting down");
    Ok(())
}
