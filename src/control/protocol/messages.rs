//! Control protocol message types
//!
//! The control channel multiplexes over the same stdin/stdout stream as
//! conversation messages. Inbound requests arrive as
//! `{"type":"control_request","request_id":...,"request":{"subtype":...}}`
//! and every one of them is answered with a single
//! `{"type":"control_response","response":{...}}` line.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;

use crate::types::identifiers::{RequestId, ToolName, ToolUseId};
use crate::types::permissions::{PermissionMode, PermissionUpdate};

/// Inner payload of an inbound control request, discriminated by `subtype`
#[derive(Debug, Clone, PartialEq)]
pub enum ControlRequestInner {
    /// Handshake; this side's in-process servers were announced at startup
    Initialize {
        /// Hook registrations the process believes are active
        hooks: Option<HashMap<String, serde_json::Value>>,
    },
    /// JSON-RPC message for a named in-process tool server
    McpMessage {
        /// Target server name
        server_name: String,
        /// Embedded JSON-RPC message
        message: serde_json::Value,
    },
    /// In-band permission check for a tool invocation
    CanUseTool {
        /// Tool name
        tool_name: ToolName,
        /// Tool input parameters
        input: serde_json::Value,
        /// Permission rule suggestions from the process
        permission_suggestions: Option<Vec<PermissionUpdate>>,
        /// Path that triggered the check, when path-scoped
        blocked_path: Option<String>,
    },
    /// Interrupt notification
    Interrupt,
    /// Permission mode change notification
    SetPermissionMode {
        /// New mode
        mode: String,
    },
    /// Lifecycle hook callback
    HookCallback {
        /// Registered callback being invoked
        callback_id: String,
        /// Free-form hook input
        input: serde_json::Value,
        /// Tool use the hook fired for, if tool-scoped
        tool_use_id: Option<ToolUseId>,
    },
    /// File checkpoint rewind notification
    RewindFiles {
        /// UUID of the user message to rewind to
        user_message_uuid: String,
    },
    /// Subtype this crate does not recognize; answered with an error
    /// response, never silently dropped
    Other {
        /// The unrecognized subtype
        subtype: String,
        /// Raw request payload
        payload: serde_json::Value,
    },
}

/// Derived mirror of the recognized subtypes; `ControlRequestInner` needs
/// hand-written serde for the catch-all.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "subtype", rename_all = "snake_case")]
enum TaggedControlRequest {
    Initialize {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        hooks: Option<HashMap<String, serde_json::Value>>,
    },
    McpMessage {
        #[serde(alias = "mcpServerName", alias = "mcp_server_name")]
        server_name: String,
        message: serde_json::Value,
    },
    CanUseTool {
        #[serde(alias = "toolName")]
        tool_name: ToolName,
        input: serde_json::Value,
        #[serde(
            default,
            alias = "permissionSuggestions",
            skip_serializing_if = "Option::is_none"
        )]
        permission_suggestions: Option<Vec<PermissionUpdate>>,
        #[serde(default, alias = "blockedPath", skip_serializing_if = "Option::is_none")]
        blocked_path: Option<String>,
    },
    Interrupt,
    SetPermissionMode {
        mode: String,
    },
    HookCallback {
        #[serde(alias = "callbackId")]
        callback_id: String,
        input: serde_json::Value,
        #[serde(default, alias = "toolUseId", skip_serializing_if = "Option::is_none")]
        tool_use_id: Option<ToolUseId>,
    },
    RewindFiles {
        #[serde(alias = "userMessageUuid", alias = "user_message_id")]
        user_message_uuid: String,
    },
}

const KNOWN_CONTROL_SUBTYPES: &[&str] = &[
    "initialize",
    "mcp_message",
    "can_use_tool",
    "interrupt",
    "set_permission_mode",
    "hook_callback",
    "rewind_files",
];

impl From<TaggedControlRequest> for ControlRequestInner {
    fn from(request: TaggedControlRequest) -> Self {
        match request {
            TaggedControlRequest::Initialize { hooks } => Self::Initialize { hooks },
            TaggedControlRequest::McpMessage {
                server_name,
                message,
            } => Self::McpMessage {
                server_name,
                message,
            },
            TaggedControlRequest::CanUseTool {
                tool_name,
                input,
                permission_suggestions,
                blocked_path,
            } => Self::CanUseTool {
                tool_name,
                input,
                permission_suggestions,
                blocked_path,
            },
            TaggedControlRequest::Interrupt => Self::Interrupt,
            TaggedControlRequest::SetPermissionMode { mode } => Self::SetPermissionMode { mode },
            TaggedControlRequest::HookCallback {
                callback_id,
                input,
                tool_use_id,
            } => Self::HookCallback {
                callback_id,
                input,
                tool_use_id,
            },
            TaggedControlRequest::RewindFiles { user_message_uuid } => {
                Self::RewindFiles { user_message_uuid }
            }
        }
    }
}

impl ControlRequestInner {
    fn as_tagged(&self) -> Option<TaggedControlRequest> {
        match self {
            Self::Initialize { hooks } => Some(TaggedControlRequest::Initialize {
                hooks: hooks.clone(),
            }),
            Self::McpMessage {
                server_name,
                message,
            } => Some(TaggedControlRequest::McpMessage {
                server_name: server_name.clone(),
                message: message.clone(),
            }),
            Self::CanUseTool {
                tool_name,
                input,
                permission_suggestions,
                blocked_path,
            } => Some(TaggedControlRequest::CanUseTool {
                tool_name: tool_name.clone(),
                input: input.clone(),
                permission_suggestions: permission_suggestions.clone(),
                blocked_path: blocked_path.clone(),
            }),
            Self::Interrupt => Some(TaggedControlRequest::Interrupt),
            Self::SetPermissionMode { mode } => Some(TaggedControlRequest::SetPermissionMode {
                mode: mode.clone(),
            }),
            Self::HookCallback {
                callback_id,
                input,
                tool_use_id,
            } => Some(TaggedControlRequest::HookCallback {
                callback_id: callback_id.clone(),
                input: input.clone(),
                tool_use_id: tool_use_id.clone(),
            }),
            Self::RewindFiles { user_message_uuid } => Some(TaggedControlRequest::RewindFiles {
                user_message_uuid: user_message_uuid.clone(),
            }),
            Self::Other { .. } => None,
        }
    }

    /// Subtype string for logging and error responses
    #[must_use]
    pub fn subtype(&self) -> &str {
        match self {
            Self::Initialize { .. } => "initialize",
            Self::McpMessage { .. } => "mcp_message",
            Self::CanUseTool { .. } => "can_use_tool",
            Self::Interrupt => "interrupt",
            Self::SetPermissionMode { .. } => "set_permission_mode",
            Self::HookCallback { .. } => "hook_callback",
            Self::RewindFiles { .. } => "rewind_files",
            Self::Other { subtype, .. } => subtype,
        }
    }
}

impl Serialize for ControlRequestInner {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Other { payload, .. } => payload.serialize(serializer),
            other => other
                .as_tagged()
                .expect("non-Other request maps to a tagged variant")
                .serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for ControlRequestInner {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        let subtype = value.get("subtype").and_then(|s| s.as_str()).unwrap_or("");
        if KNOWN_CONTROL_SUBTYPES.contains(&subtype) {
            serde_json::from_value::<TaggedControlRequest>(value)
                .map(Into::into)
                .map_err(D::Error::custom)
        } else {
            Ok(Self::Other {
                subtype: subtype.to_string(),
                payload: value,
            })
        }
    }
}

/// Control requests this side initiates
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "subtype", rename_all = "snake_case")]
pub enum OutboundControlRequest {
    /// Startup announcement of in-process tool servers
    Initialize {
        /// Names the process may route `mcp_message` requests to
        #[serde(rename = "sdkMcpServers")]
        sdk_mcp_servers: Vec<String>,
    },
    /// Change the permission mode for the rest of the session
    SetPermissionMode {
        /// New mode
        mode: PermissionMode,
    },
    /// Change the model for the rest of the session
    SetModel {
        /// Model to switch to; `None` restores the configured default
        #[serde(skip_serializing_if = "Option::is_none")]
        model: Option<String>,
    },
}

/// Payload of an outbound `control_response` line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "subtype", rename_all = "snake_case")]
pub enum ControlResponsePayload {
    /// The request was handled
    Success {
        /// ID of the request being answered
        request_id: RequestId,
        /// Handler-specific payload
        #[serde(skip_serializing_if = "Option::is_none")]
        response: Option<serde_json::Value>,
    },
    /// The request could not be handled
    Error {
        /// ID of the request being answered
        request_id: RequestId,
        /// What went wrong
        error: String,
    },
}

impl ControlResponsePayload {
    /// Build a success response
    pub fn success(request_id: RequestId, response: Option<serde_json::Value>) -> Self {
        Self::Success {
            request_id,
            response,
        }
    }

    /// Build an error response
    pub fn error(request_id: RequestId, error: impl Into<String>) -> Self {
        Self::Error {
            request_id,
            error: error.into(),
        }
    }

    /// ID of the request this payload answers
    #[must_use]
    pub fn request_id(&self) -> &RequestId {
        match self {
            Self::Success { request_id, .. } | Self::Error { request_id, .. } => request_id,
        }
    }
}
