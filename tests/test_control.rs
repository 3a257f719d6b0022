//! Unit tests for the control bridge
//!
//! Every control request must produce exactly one response with a matching
//! request id; tool failures stay tool-level, never transport-level.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use claude_bridge::control::{ControlBridge, ControlRequestInner, ControlResponsePayload};
use claude_bridge::mcp::{SdkMcpServer, SdkTool, ToolResult};
use claude_bridge::{
    HookManager, HookPipeline, OutboundMessage, PermissionManager, PermissionMode,
    PermissionResult, ToolName,
};
use serde_json::json;

fn pipeline() -> Arc<HookPipeline> {
    Arc::new(HookPipeline::new(
        HookManager::new(),
        PermissionManager::new(),
        PermissionMode::Default,
        ToolName::new("Task"),
        None,
    ))
}

fn bridge_with_calculator() -> ControlBridge {
    let server = SdkMcpServer::new("calculator")
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
        .tool(SdkTool::new(
            "explode",
            "Always fails",
            json!({"type": "object"}),
            |_input| async move { anyhow::bail!("the tool exploded") },
        ));

    let mut servers = HashMap::new();
    servers.insert("calculator".to_string(), server);
    ControlBridge::new(servers, pipeline())
}

fn response_payload(message: OutboundMessage) -> ControlResponsePayload {
    match message {
        OutboundMessage::ControlResponse { response } => response,
        other => panic!("expected ControlResponse, got {other:?}"),
    }
}

#[tokio::test]
async fn test_initialize_acknowledged() {
    let bridge = bridge_with_calculator();
    let response = bridge
        .handle("req-1".into(), ControlRequestInner::Initialize { hooks: None })
        .await;
    match response_payload(response) {
        ControlResponsePayload::Success { request_id, .. } => {
            assert_eq!(request_id.as_str(), "req-1");
        }
        other => panic!("expected success, got {other:?}"),
    }
}

#[tokio::test]
async fn test_mcp_message_routed_to_server() {
    let bridge = bridge_with_calculator();
    let response = bridge
        .handle(
            "req-2".into(),
            ControlRequestInner::McpMessage {
                server_name: "calculator".to_string(),
                message: json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "method": "tools/call",
                    "params": {"name": "add", "arguments": {"a": 2, "b": 3}}
                }),
            },
        )
        .await;

    match response_payload(response) {
        ControlResponsePayload::Success {
            request_id,
            response,
        } => {
            assert_eq!(request_id.as_str(), "req-2");
            let body = response.unwrap();
            let rpc = &body["mcp_response"];
            assert_eq!(rpc["result"]["isError"], false);
            assert_eq!(rpc["result"]["content"][0]["text"], "5");
        }
        other => panic!("expected success, got {other:?}"),
    }
}

#[tokio::test]
async fn test_mcp_message_unknown_server() {
    let bridge = bridge_with_calculator();
    let response = bridge
        .handle(
            "req-3".into(),
            ControlRequestInner::McpMessage {
                server_name: "nonexistent".to_string(),
                message: json!({"jsonrpc": "2.0", "id": 1, "method": "ping"}),
            },
        )
        .await;

    match response_payload(response) {
        ControlResponsePayload::Error { request_id, error } => {
            assert_eq!(request_id.as_str(), "req-3");
            assert!(error.contains("nonexistent"));
        }
        other => panic!("expected error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_failing_tool_is_a_tool_level_error() {
    let bridge = bridge_with_calculator();
    let response = bridge
        .handle(
            "req-4".into(),
            ControlRequestInner::McpMessage {
                server_name: "calculator".to_string(),
                message: json!({
                    "jsonrpc": "2.0",
                    "id": 9,
                    "method": "tools/call",
                    "params": {"name": "explode", "arguments": {}}
                }),
            },
        )
        .await;

    // A throwing handler yields a JSON-RPC *success* whose payload carries
    // isError, never a JSON-RPC error envelope
    match response_payload(response) {
        ControlResponsePayload::Success { response, .. } => {
            let body = response.unwrap();
            let rpc = &body["mcp_response"];
            assert!(rpc.get("error").is_none());
            assert_eq!(rpc["result"]["isError"], true);
            assert!(
                rpc["result"]["content"][0]["text"]
                    .as_str()
                    .unwrap()
                    .contains("the tool exploded")
            );
        }
        other => panic!("expected success, got {other:?}"),
    }
}

#[tokio::test]
async fn test_can_use_tool_defaults_to_allow() {
    let bridge = bridge_with_calculator();
    let response = bridge
        .handle(
            "req-5".into(),
            ControlRequestInner::CanUseTool {
                tool_name: ToolName::new("Bash"),
                input: json!({"command": "ls"}),
                permission_suggestions: None,
                blocked_path: None,
            },
        )
        .await;

    match response_payload(response) {
        ControlResponsePayload::Success { response, .. } => {
            let body = response.unwrap();
            assert_eq!(body["behavior"], "allow");
            assert_eq!(body["updatedInput"], json!({"command": "ls"}));
        }
        other => panic!("expected success, got {other:?}"),
    }
}

#[tokio::test]
async fn test_can_use_tool_with_deny_callback() {
    let mut permissions = PermissionManager::new();
    permissions.set_callback(PermissionManager::callback(
        |_tool_name, _input, _context| async move {
            Ok(PermissionResult::deny("not on my watch"))
        },
    ));
    let pipeline = Arc::new(HookPipeline::new(
        HookManager::new(),
        permissions,
        PermissionMode::Default,
        ToolName::new("Task"),
        None,
    ));
    let bridge = ControlBridge::new(HashMap::new(), pipeline);

    let response = bridge
        .handle(
            "req-6".into(),
            ControlRequestInner::CanUseTool {
                tool_name: ToolName::new("Bash"),
                input: json!({}),
                permission_suggestions: None,
                blocked_path: None,
            },
        )
        .await;

    match response_payload(response) {
        ControlResponsePayload::Success { response, .. } => {
            let body = response.unwrap();
            assert_eq!(body["behavior"], "deny");
            assert_eq!(body["message"], "not on my watch");
        }
        other => panic!("expected success, got {other:?}"),
    }
}

#[tokio::test]
async fn test_hook_callback_succeeds_regardless_of_outcome() {
    use claude_bridge::{HookEvent, HookMatcherBuilder, HookOutput};

    let fired = Arc::new(AtomicBool::new(false));
    let fired_clone = fired.clone();
    let mut hooks = HookManager::new();
    hooks.register(
        HookEvent::PreCompact,
        HookMatcherBuilder::new(None::<String>)
            .add_hook(HookManager::callback(move |_input, _context| {
                let fired = fired_clone.clone();
                async move {
                    fired.store(true, Ordering::SeqCst);
                    Ok(HookOutput::block("even a block stays a success here"))
                }
            }))
            .build(),
    );
    let pipeline = Arc::new(HookPipeline::new(
        hooks,
        PermissionManager::new(),
        PermissionMode::Default,
        ToolName::new("Task"),
        None,
    ));
    let bridge = ControlBridge::new(HashMap::new(), pipeline);

    let response = bridge
        .handle(
            "req-7".into(),
            ControlRequestInner::HookCallback {
                callback_id: "hook-1".to_string(),
                input: json!({"hook_event_name": "PreCompact", "trigger": "auto"}),
                tool_use_id: None,
            },
        )
        .await;

    assert!(fired.load(Ordering::SeqCst));
    assert!(matches!(
        response_payload(response),
        ControlResponsePayload::Success { .. }
    ));
}

#[tokio::test]
async fn test_unknown_subtype_gets_error_response() {
    let bridge = bridge_with_calculator();
    let response = bridge
        .handle(
            "req-8".into(),
            ControlRequestInner::Other {
                subtype: "set_thrusters".to_string(),
                payload: json!({"subtype": "set_thrusters"}),
            },
        )
        .await;

    match response_payload(response) {
        ControlResponsePayload::Error { request_id, error } => {
            assert_eq!(request_id.as_str(), "req-8");
            assert!(error.contains("set_thrusters"));
        }
        other => panic!("expected error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_notification_plumbing_subtypes_acknowledged() {
    let bridge = bridge_with_calculator();
    for (i, request) in [
        ControlRequestInner::Interrupt,
        ControlRequestInner::SetPermissionMode {
            mode: "plan".to_string(),
        },
        ControlRequestInner::RewindFiles {
            user_message_uuid: "u1".to_string(),
        },
    ]
    .into_iter()
    .enumerate()
    {
        let id = format!("req-ack-{i}");
        let response = bridge.handle(id.as_str().into(), request).await;
        match response_payload(response) {
            ControlResponsePayload::Success { request_id, .. } => {
                assert_eq!(request_id.as_str(), id);
            }
            other => panic!("expected success, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_responses_never_cross_associate() {
    let bridge = bridge_with_calculator();

    // Answer two requests "out of order": each response still carries its
    // own request id
    let second = bridge
        .handle(
            "req-b".into(),
            ControlRequestInner::McpMessage {
                server_name: "calculator".to_string(),
                message: json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
            },
        )
        .await;
    let first = bridge
        .handle("req-a".into(), ControlRequestInner::Interrupt)
        .await;

    assert_eq!(response_payload(second).request_id().as_str(), "req-b");
    assert_eq!(response_payload(first).request_id().as_str(), "req-a");
}
