//! Unit tests for `PermissionManager`

use claude_bridge::{
    PermissionManager, PermissionResult, ToolName, ToolPermissionContext,
};

#[tokio::test]
async fn test_permission_manager_default_allow() {
    let manager = PermissionManager::new();

    let result = manager
        .can_use_tool(
            ToolName::new("test_tool"),
            serde_json::json!({}),
            ToolPermissionContext::default(),
        )
        .await
        .unwrap();

    match result {
        PermissionResult::Allow(_) => {}
        PermissionResult::Deny(_) => panic!("Expected allow"),
    }
}

#[tokio::test]
async fn test_permission_manager_disallowed() {
    let mut manager = PermissionManager::new();
    manager.set_disallowed_tools(vec![ToolName::new("bad_tool")]);

    let result = manager
        .can_use_tool(
            ToolName::new("bad_tool"),
            serde_json::json!({}),
            ToolPermissionContext::default(),
        )
        .await
        .unwrap();

    match result {
        PermissionResult::Allow(_) => panic!("Expected deny"),
        PermissionResult::Deny(deny) => assert!(deny.message.contains("bad_tool")),
    }
}

#[tokio::test]
async fn test_permission_manager_allowed_list() {
    let mut manager = PermissionManager::new();
    manager.set_allowed_tools(Some(vec![ToolName::new("good_tool")]));

    // Should allow good_tool
    let result = manager
        .can_use_tool(
            ToolName::new("good_tool"),
            serde_json::json!({}),
            ToolPermissionContext::default(),
        )
        .await
        .unwrap();

    match result {
        PermissionResult::Allow(_) => {}
        PermissionResult::Deny(_) => panic!("Expected allow"),
    }

    // Should deny other_tool
    let result = manager
        .can_use_tool(
            ToolName::new("other_tool"),
            serde_json::json!({}),
            ToolPermissionContext::default(),
        )
        .await
        .unwrap();

    match result {
        PermissionResult::Allow(_) => panic!("Expected deny"),
        PermissionResult::Deny(_) => {}
    }
}

#[tokio::test]
async fn test_empty_allowed_list_means_no_allowlist() {
    let mut manager = PermissionManager::new();
    manager.set_allowed_tools(Some(vec![]));

    let result = manager
        .can_use_tool(
            ToolName::new("anything"),
            serde_json::json!({}),
            ToolPermissionContext::default(),
        )
        .await
        .unwrap();

    assert!(result.is_allow());
}

#[tokio::test]
async fn test_callback_decides_when_registered() {
    let mut manager = PermissionManager::new();
    manager.set_callback(PermissionManager::callback(
        |tool_name, _input, _context| async move {
            if tool_name.as_str() == "Read" {
                Ok(PermissionResult::allow())
            } else {
                Ok(PermissionResult::deny("read-only session"))
            }
        },
    ));

    let allow = manager
        .can_use_tool(
            ToolName::new("Read"),
            serde_json::json!({}),
            ToolPermissionContext::default(),
        )
        .await
        .unwrap();
    assert!(allow.is_allow());

    let deny = manager
        .can_use_tool(
            ToolName::new("Write"),
            serde_json::json!({}),
            ToolPermissionContext::default(),
        )
        .await
        .unwrap();
    match deny {
        PermissionResult::Deny(deny) => assert_eq!(deny.message, "read-only session"),
        PermissionResult::Allow(_) => panic!("Expected deny"),
    }
}

#[tokio::test]
async fn test_disallowed_wins_over_callback() {
    let mut manager = PermissionManager::new();
    manager.set_disallowed_tools(vec![ToolName::new("Bash")]);
    manager.set_callback(PermissionManager::callback(
        |_tool_name, _input, _context| async move { Ok(PermissionResult::allow()) },
    ));

    let result = manager
        .can_use_tool(
            ToolName::new("Bash"),
            serde_json::json!({}),
            ToolPermissionContext::default(),
        )
        .await
        .unwrap();

    assert!(!result.is_allow());
}
