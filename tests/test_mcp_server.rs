//! Integration tests for the in-process sdk MCP server

use claude_bridge::mcp::{SdkMcpServer, SdkTool, ToolContent, ToolResult};
use serde_json::json;

fn calculator() -> SdkMcpServer {
    SdkMcpServer::new("calculator")
        .version("2.0.0")
        .tool(SdkTool::new(
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
async fn test_tools_call_add() {
    let server = calculator();
    let response = server
        .handle(&json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/call",
            "params": {"name": "add", "arguments": {"a": 2, "b": 3}}
        }))
        .await
        .unwrap();

    assert_eq!(response["jsonrpc"], "2.0");
    assert_eq!(response["id"], 1);
    assert_eq!(response["result"]["isError"], false);
    assert_eq!(response["result"]["content"][0]["text"], "5");
}

#[tokio::test]
async fn test_tools_list_empty_server() {
    let server = SdkMcpServer::new("empty");
    let response = server
        .handle(&json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}))
        .await
        .unwrap();

    // Zero registered tools is an empty array, not an error
    assert!(response.get("error").is_none());
    assert_eq!(response["result"]["tools"], json!([]));
}

#[tokio::test]
async fn test_tools_list_metadata() {
    let server = calculator();
    let response = server
        .handle(&json!({"jsonrpc": "2.0", "id": 3, "method": "tools/list"}))
        .await
        .unwrap();

    let tools = response["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0]["name"], "add");
    assert_eq!(tools[0]["description"], "Add two numbers");
    assert_eq!(tools[0]["inputSchema"]["type"], "object");
}

#[tokio::test]
async fn test_failing_handler_becomes_tool_error() {
    let server = SdkMcpServer::new("fragile").tool(SdkTool::new(
        "boom",
        "Always fails",
        json!({"type": "object"}),
        |_input| async move { anyhow::bail!("handler blew up") },
    ));

    let response = server
        .handle(&json!({
            "jsonrpc": "2.0",
            "id": 4,
            "method": "tools/call",
            "params": {"name": "boom", "arguments": {}}
        }))
        .await
        .unwrap();

    // Success envelope with isError set, never a JSON-RPC error
    assert!(response.get("error").is_none());
    assert_eq!(response["result"]["isError"], true);
    assert!(
        response["result"]["content"][0]["text"]
            .as_str()
            .unwrap()
            .contains("handler blew up")
    );
}

#[tokio::test]
async fn test_unknown_tool_is_invalid_params() {
    let server = calculator();
    let response = server
        .handle(&json!({
            "jsonrpc": "2.0",
            "id": 5,
            "method": "tools/call",
            "params": {"name": "subtract", "arguments": {}}
        }))
        .await
        .unwrap();

    assert_eq!(response["error"]["code"], -32602);
}

#[tokio::test]
async fn test_unknown_method() {
    let server = calculator();
    let response = server
        .handle(&json!({"jsonrpc": "2.0", "id": 6, "method": "resources/list"}))
        .await
        .unwrap();

    assert_eq!(response["error"]["code"], -32601);
    assert!(
        response["error"]["message"]
            .as_str()
            .unwrap()
            .contains("resources/list")
    );
}

#[tokio::test]
async fn test_ping() {
    let server = calculator();
    let response = server
        .handle(&json!({"jsonrpc": "2.0", "id": 7, "method": "ping"}))
        .await
        .unwrap();

    assert_eq!(response["result"], json!({}));
}

#[test]
fn test_ping_from_blocking_context() {
    let server = calculator();
    let response =
        tokio_test::block_on(server.handle(&json!({"jsonrpc": "2.0", "id": 8, "method": "ping"})))
            .unwrap();
    assert_eq!(response["id"], 8);
}

#[tokio::test]
async fn test_initialized_notification_silent() {
    let server = calculator();
    let response = server
        .handle(&json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
        .await;
    assert!(response.is_none());
}

#[tokio::test]
async fn test_direct_call_tool() {
    let server = calculator();
    let result = server
        .call_tool("add", json!({"a": 40, "b": 2}))
        .await
        .unwrap();
    assert_eq!(
        result.content,
        vec![ToolContent::Text {
            text: "42".to_string()
        }]
    );
    assert!(!result.is_error);

    let missing = server.call_tool("nope", json!({})).await;
    assert!(missing.is_err());
}

#[test]
fn test_schema_of_derives_from_type() {
    #[derive(schemars::JsonSchema)]
    #[allow(dead_code)]
    struct AddArgs {
        a: f64,
        b: f64,
    }

    let schema = SdkTool::schema_of::<AddArgs>();
    assert_eq!(schema["type"], "object");
    assert!(schema["properties"].get("a").is_some());
}
