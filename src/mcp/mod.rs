//! In-process sdk MCP tool servers
//!
//! A host application registers tool handlers here; the agent process calls
//! them mid-turn by routing `mcp_message` control requests back over the
//! control channel. The server speaks just enough JSON-RPC 2.0 for that
//! exchange; there is no socket and no separate process.
//!
//! A handler that fails produces a *successful* `tools/call` response whose
//! payload sets `isError`, so the process can reason about the failure
//! instead of aborting the turn.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::{BridgeError, Result};

/// MCP protocol version reported by `initialize`
pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

/// One item of tool output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolContent {
    /// Text content
    Text {
        /// The text
        text: String,
    },
    /// Binary content with a mime type
    Image {
        /// Base64-encoded data
        data: String,
        /// Mime type
        #[serde(rename = "mimeType")]
        mime_type: String,
    },
}

/// Result of a tool invocation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Content items, in order
    pub content: Vec<ToolContent>,
    /// Whether the tool failed at the tool level
    #[serde(rename = "isError", default)]
    pub is_error: bool,
}

impl ToolResult {
    /// Successful result with a single text item
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: false,
        }
    }

    /// Error result with a single text item
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: true,
        }
    }
}

/// Async tool handler from an argument map to a [`ToolResult`]
pub type ToolHandler = Arc<
    dyn Fn(Value) -> Pin<Box<dyn Future<Output = anyhow::Result<ToolResult>> + Send>>
        + Send
        + Sync,
>;

/// A registered tool: name, description, input schema, handler
#[derive(Clone)]
pub struct SdkTool {
    /// Tool name
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// JSON Schema for the argument map
    pub input_schema: Value,
    handler: ToolHandler,
}

impl SdkTool {
    /// Create a tool from a schema value and an async handler
    pub fn new<F, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
        handler: F,
    ) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<ToolResult>> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
            handler: Arc::new(move |args| Box::pin(handler(args))),
        }
    }

    /// Derive the input schema from a Rust type
    #[must_use]
    pub fn schema_of<T: schemars::JsonSchema>() -> Value {
        serde_json::to_value(schemars::schema_for!(T)).unwrap_or_else(|_| json!({}))
    }
}

impl std::fmt::Debug for SdkTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SdkTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("input_schema", &self.input_schema)
            .finish()
    }
}

/// An in-process tool server the agent process can call into
#[derive(Debug, Clone)]
pub struct SdkMcpServer {
    /// Server name, as announced in the initialize control request
    pub name: String,
    /// Server version
    pub version: String,
    tools: Vec<SdkTool>,
}

impl SdkMcpServer {
    /// Create a new server
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: "1.0.0".to_string(),
            tools: Vec::new(),
        }
    }

    /// Set the server version
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Register a tool
    #[must_use]
    pub fn tool(mut self, tool: SdkTool) -> Self {
        self.tools.push(tool);
        self
    }

    /// Registered tools, in registration order
    #[must_use]
    pub fn tools(&self) -> &[SdkTool] {
        &self.tools
    }

    fn find_tool(&self, name: &str) -> Option<&SdkTool> {
        self.tools.iter().find(|t| t.name == name)
    }

    /// Handle one JSON-RPC message
    ///
    /// Returns `None` for notifications, which get no response line.
    pub async fn handle(&self, request: &Value) -> Option<Value> {
        let method = request.get("method").and_then(|m| m.as_str())?;
        let Some(id) = request.get("id").filter(|id| !id.is_null()).cloned() else {
            // Notification; acknowledged by doing nothing
            log::debug!("mcp server '{}': notification {method}", self.name);
            return None;
        };

        let response = match method {
            "initialize" => success_response(id, self.handle_initialize()),
            "tools/list" => success_response(id, self.handle_tools_list()),
            "tools/call" => self.handle_tools_call(id, request.get("params")).await,
            "ping" => success_response(id, json!({})),
            _ => error_response(id, METHOD_NOT_FOUND, format!("Method not found: {method}")),
        };
        Some(response)
    }

    fn handle_initialize(&self) -> Value {
        json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": self.name,
                "version": self.version,
            },
        })
    }

    fn handle_tools_list(&self) -> Value {
        let tools: Vec<Value> = self
            .tools
            .iter()
            .map(|t| {
                json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema,
                })
            })
            .collect();
        json!({ "tools": tools })
    }

    async fn handle_tools_call(&self, id: Value, params: Option<&Value>) -> Value {
        let Some(params) = params else {
            return error_response(id, INVALID_PARAMS, "Missing params for tools/call");
        };
        let Some(name) = params.get("name").and_then(|n| n.as_str()) else {
            return error_response(id, INVALID_PARAMS, "Missing 'name' in tools/call params");
        };
        let Some(tool) = self.find_tool(name) else {
            return error_response(id, INVALID_PARAMS, format!("Unknown tool: {name}"));
        };
        let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

        let result = match (tool.handler)(arguments).await {
            Ok(result) => result,
            // Tool-level failure, not a protocol failure
            Err(e) => ToolResult::error(e.to_string()),
        };
        let payload = serde_json::to_value(&result)
            .unwrap_or_else(|e| json!({ "content": [], "isError": true, "error": e.to_string() }));
        success_response(id, payload)
    }

    /// Invoke a tool directly, bypassing JSON-RPC framing
    ///
    /// Handler failures come back as error results, matching what the framed
    /// path would report.
    ///
    /// # Errors
    /// Returns an error only when no tool with that name is registered
    pub async fn call_tool(&self, name: &str, args: Value) -> Result<ToolResult> {
        let tool = self
            .find_tool(name)
            .ok_or_else(|| BridgeError::mcp(format!("Unknown tool: {name}")))?;
        Ok(match (tool.handler)(args).await {
            Ok(result) => result,
            Err(e) => ToolResult::error(e.to_string()),
        })
    }
}

const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;

fn success_response(id: Value, result: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result,
    })
}

fn error_response(id: Value, code: i64, message: impl Into<String>) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {
            "code": code,
            "message": message.into(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calculator() -> SdkMcpServer {
        SdkMcpServer::new("calculator").tool(SdkTool::new(
            "add",
            "Add two numbers",
            json!({"type": "object", "properties": {
                "a": {"type": "number"},
                "b": {"type": "number"}
            }}),
            |input| async move {
                let a = input["a"].as_f64().unwrap_or(0.0);
                let b = input["b"].as_f64().unwrap_or(0.0);
                Ok(ToolResult::text(format!("{}", a + b)))
            },
        ))
    }

    #[tokio::test]
    async fn initialize_reports_identity() {
        let server = calculator();
        let response = server
            .handle(&json!({"jsonrpc": "2.0", "id": 1, "method": "initialize"}))
            .await
            .unwrap();
        assert_eq!(response["id"], 1);
        assert_eq!(response["result"]["serverInfo"]["name"], "calculator");
        assert_eq!(
            response["result"]["protocolVersion"],
            MCP_PROTOCOL_VERSION
        );
    }

    #[tokio::test]
    async fn notification_gets_no_response() {
        let server = calculator();
        let response = server
            .handle(&json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
            .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn unknown_method_is_rejected() {
        let server = calculator();
        let response = server
            .handle(&json!({"jsonrpc": "2.0", "id": 7, "method": "bogus/method"}))
            .await
            .unwrap();
        assert_eq!(response["error"]["code"], METHOD_NOT_FOUND);
        assert_eq!(response["id"], 7);
    }

    #[tokio::test]
    async fn direct_call_path() {
        let server = calculator();
        let result = server
            .call_tool("add", json!({"a": 2, "b": 3}))
            .await
            .unwrap();
        assert_eq!(result.content, vec![ToolContent::Text { text: "5".into() }]);
        assert!(!result.is_error);
    }
}
