//! Core type definitions
//!
//! Wire message models, identifiers, hook and permission types, and session
//! configuration.

pub mod hooks;
pub mod identifiers;
pub mod mcp;
pub mod messages;
pub mod options;
pub mod permissions;

pub use hooks::{
    HookCallback, HookContext, HookDecision, HookEvent, HookInput, HookMatcher, HookOutput,
};
pub use identifiers::{RequestId, SessionId, ToolName, ToolUseId};
pub use mcp::{
    McpHttpServerConfig, McpServerConfig, McpServers, McpStdioServerConfig,
    McpStreamableHttpConfig, SdkMcpServerMarker,
};
pub use messages::{
    AssistantMessageContent, ContentBlock, ContentValue, Message, OutboundMessage,
    UserContent, UserMessageContent,
};
pub use options::{BridgeOptions, BridgeOptionsBuilder, SystemPrompt};
pub use permissions::{
    CanUseToolCallback, PermissionMode, PermissionResult, PermissionResultAllow,
    PermissionResultDeny, PermissionRuleValue, PermissionUpdate, PermissionUpdateDestination,
    SettingSource, ToolPermissionContext,
};
