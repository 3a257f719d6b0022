//! Unit tests for message decoding
//!
//! Covers the tagged-union decode of every wire message variant, the
//! unknown-content-block fallback, and round-tripping.

use claude_bridge::{ContentBlock, Message, decode_line, parse_message};
use serde_json::json;

#[test]
fn test_parse_user_message() {
    let data = json!({
        "type": "user",
        "message": {
            "role": "user",
            "content": "Hello, Claude!"
        }
    });

    let result = parse_message(data);
    assert!(result.is_ok());
}

#[test]
fn test_parse_unrecognized_type_is_error() {
    let data = json!({
        "type": "invalid_type",
        "data": "some data"
    });

    let result = parse_message(data);
    assert!(result.is_err());
}

#[test]
fn test_parse_missing_type_is_error() {
    let result = parse_message(json!({"subtype": "success"}));
    assert!(result.is_err());
}

#[test]
fn test_decode_line_invalid_json_keeps_raw_line() {
    let err = decode_line("not json at all").unwrap_err();
    match err {
        claude_bridge::BridgeError::MessageParse { data, .. } => {
            assert_eq!(data, Some(json!("not json at all")));
        }
        other => panic!("expected MessageParse, got {other:?}"),
    }
}

#[test]
fn test_result_success_without_metrics() {
    // Numeric metric fields are optional; absence is not an error
    let message =
        decode_line(r#"{"type":"result","subtype":"success","uuid":"r1","session_id":"s1"}"#)
            .unwrap();
    assert!(message.is_terminal());
    assert!(message.is_success());
    assert_eq!(message.session_id().unwrap().as_str(), "s1");
}

#[test]
fn test_result_error_subtype_not_success() {
    let message = decode_line(
        r#"{"type":"result","subtype":"error_max_turns","is_error":true,"session_id":"s1"}"#,
    )
    .unwrap();
    assert!(message.is_terminal());
    assert!(!message.is_success());
}

#[test]
fn test_result_with_structured_output_alias() {
    let message = decode_line(
        r#"{"type":"result","subtype":"success","session_id":"s1","structuredOutput":{"answer":4}}"#,
    )
    .unwrap();
    match message {
        Message::Result {
            structured_output, ..
        } => assert_eq!(structured_output, Some(json!({"answer": 4}))),
        other => panic!("expected Result, got {other:?}"),
    }
}

#[test]
fn test_assistant_message_blocks() {
    let data = json!({
        "type": "assistant",
        "uuid": "a1",
        "session_id": "s1",
        "message": {
            "model": "claude-sonnet-4-5",
            "content": [
                {"type": "text", "text": "Let me check."},
                {"type": "thinking", "thinking": "hmm", "signature": "sig"},
                {"type": "tool_use", "id": "tu1", "name": "Read", "input": {"file_path": "a.txt"}},
                {"type": "tool_result", "tool_use_id": "tu1", "content": "ok", "is_error": false}
            ]
        }
    });

    let message = parse_message(data).unwrap();
    let Message::Assistant { message, .. } = message else {
        panic!("expected Assistant");
    };
    assert_eq!(message.content.len(), 4);
    assert!(matches!(&message.content[0], ContentBlock::Text { text } if text == "Let me check."));
    assert!(
        matches!(&message.content[2], ContentBlock::ToolUse { name, .. } if name.as_str() == "Read")
    );
}

#[test]
fn test_unknown_block_type_does_not_fail_message() {
    let raw_block = json!({
        "type": "server_tool_use",
        "id": "x1",
        "future_field": [1, 2, 3]
    });
    let data = json!({
        "type": "assistant",
        "message": {
            "content": [
                {"type": "text", "text": "hi"},
                raw_block.clone()
            ]
        }
    });

    let message = parse_message(data).unwrap();
    let Message::Assistant { message, .. } = message else {
        panic!("expected Assistant");
    };
    match &message.content[1] {
        ContentBlock::Unknown(value) => assert_eq!(value, &raw_block),
        other => panic!("expected Unknown, got {other:?}"),
    }

    // The preserved bytes re-serialize losslessly
    let reencoded = serde_json::to_value(&message.content[1]).unwrap();
    assert_eq!(reencoded, raw_block);
}

#[test]
fn test_known_block_with_missing_fields_is_error() {
    let data = json!({
        "type": "assistant",
        "message": {
            "content": [
                {"type": "tool_use", "name": "Read"}
            ]
        }
    });
    assert!(parse_message(data).is_err());
}

#[test]
fn test_message_round_trip() {
    let original = json!({
        "type": "assistant",
        "uuid": "a1",
        "session_id": "s1",
        "message": {
            "model": "m",
            "content": [
                {"type": "text", "text": "hello"},
                {"type": "tool_use", "id": "tu1", "name": "Bash", "input": {"command": "ls"}}
            ]
        }
    });

    let message = parse_message(original.clone()).unwrap();
    let reencoded = serde_json::to_value(&message).unwrap();
    assert_eq!(reencoded, original);
}

#[test]
fn test_permission_request_decode() {
    let message = decode_line(
        r#"{"type":"permission_request","tool_use_id":"tu9","tool_name":"Bash","tool_input":{"command":"rm -rf /"}}"#,
    )
    .unwrap();
    match message {
        Message::PermissionRequest {
            tool_use_id,
            tool_name,
            ..
        } => {
            assert_eq!(tool_use_id.as_str(), "tu9");
            assert_eq!(tool_name.as_str(), "Bash");
        }
        other => panic!("expected PermissionRequest, got {other:?}"),
    }
}

#[test]
fn test_stream_event_decode() {
    let message = decode_line(
        r#"{"type":"stream_event","uuid":"e1","session_id":"s1","event":{"type":"content_block_delta"}}"#,
    )
    .unwrap();
    assert!(matches!(message, Message::StreamEvent { .. }));
}

#[test]
fn test_system_message_keeps_extra_data() {
    let message = decode_line(
        r#"{"type":"system","subtype":"init","session_id":"s1","model":"m","tools":["Bash"]}"#,
    )
    .unwrap();
    match message {
        Message::System { subtype, data, .. } => {
            assert_eq!(subtype, "init");
            assert_eq!(data["model"], "m");
        }
        other => panic!("expected System, got {other:?}"),
    }
}

#[test]
fn test_control_request_decode() {
    let message = decode_line(
        r#"{"type":"control_request","request_id":"req-1","request":{"subtype":"can_use_tool","tool_name":"Bash","input":{"command":"ls"}}}"#,
    )
    .unwrap();
    match message {
        Message::ControlRequest {
            request_id,
            request,
        } => {
            assert_eq!(request_id.as_str(), "req-1");
            assert_eq!(request.subtype(), "can_use_tool");
        }
        other => panic!("expected ControlRequest, got {other:?}"),
    }
}

#[test]
fn test_control_request_unknown_subtype_is_captured() {
    let message = decode_line(
        r#"{"type":"control_request","request_id":"req-2","request":{"subtype":"set_thrusters","level":11}}"#,
    )
    .unwrap();
    match message {
        Message::ControlRequest { request, .. } => {
            assert_eq!(request.subtype(), "set_thrusters");
            match request {
                claude_bridge::control::ControlRequestInner::Other { payload, .. } => {
                    assert_eq!(payload["level"], 11);
                }
                other => panic!("expected Other, got {other:?}"),
            }
        }
        other => panic!("expected ControlRequest, got {other:?}"),
    }
}

#[test]
fn test_control_response_is_opaque() {
    let message = decode_line(
        r#"{"type":"control_response","response":{"subtype":"success","request_id":"req-1"}}"#,
    )
    .unwrap();
    match message {
        Message::ControlResponse { response } => {
            assert_eq!(response["request_id"], "req-1");
        }
        other => panic!("expected ControlResponse, got {other:?}"),
    }
}

#[test]
fn test_outbound_user_message_shape() {
    let line = serde_json::to_value(claude_bridge::OutboundMessage::user_text("hi", None)).unwrap();
    assert_eq!(
        line,
        json!({"type": "user", "message": {"role": "user", "content": "hi"}})
    );
}

#[test]
fn test_outbound_interrupt_shape() {
    let line = serde_json::to_value(claude_bridge::OutboundMessage::Interrupt).unwrap();
    assert_eq!(line, json!({"type": "interrupt"}));
}

#[test]
fn test_outbound_permission_response_shape() {
    let line = serde_json::to_value(claude_bridge::OutboundMessage::PermissionResponse {
        tool_use_id: "tu1".into(),
        allow: false,
        reason: Some("nope".to_string()),
    })
    .unwrap();
    assert_eq!(
        line,
        json!({"type": "permission_response", "tool_use_id": "tu1", "allow": false, "reason": "nope"})
    );
}

#[test]
fn test_outbound_initialize_announces_servers() {
    use claude_bridge::control::OutboundControlRequest;
    let line = serde_json::to_value(claude_bridge::OutboundMessage::ControlRequest {
        request_id: "req-1".into(),
        request: OutboundControlRequest::Initialize {
            sdk_mcp_servers: vec!["calculator".to_string()],
        },
    })
    .unwrap();
    assert_eq!(
        line,
        json!({
            "type": "control_request",
            "request_id": "req-1",
            "request": {"subtype": "initialize", "sdkMcpServers": ["calculator"]}
        })
    );
}
