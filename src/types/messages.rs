//! Message-related type definitions
//!
//! Every line on the wire decodes into exactly one [`Message`] variant,
//! discriminated by its `type` field. Content blocks inside assistant
//! messages get a byte-preserving [`ContentBlock::Unknown`] fallback so a
//! version-skewed block never sinks the whole message.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::identifiers::{RequestId, SessionId, ToolName, ToolUseId};
use crate::control::protocol::messages::{
    ControlRequestInner, ControlResponsePayload, OutboundControlRequest,
};

/// Content value for tool results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentValue {
    /// String content
    String(String),
    /// Structured content blocks
    Blocks(Vec<serde_json::Value>),
}

/// Content block types inside an assistant message
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    /// Text content block
    Text {
        /// Text content
        text: String,
    },
    /// Thinking content block (extended thinking)
    Thinking {
        /// Thinking content
        thinking: String,
        /// Opaque signature for verification
        signature: String,
    },
    /// Redacted thinking content block
    RedactedThinking {
        /// Encrypted thinking payload
        data: String,
    },
    /// Tool use request
    ToolUse {
        /// Tool use ID
        id: ToolUseId,
        /// Tool name
        name: ToolName,
        /// Tool input parameters
        input: serde_json::Value,
    },
    /// Tool execution result
    ToolResult {
        /// ID of the tool use this is a result for
        tool_use_id: ToolUseId,
        /// Result content
        content: Option<ContentValue>,
        /// Whether this is an error result
        is_error: Option<bool>,
    },
    /// Block type this crate does not recognize; the original value is kept
    /// verbatim so it re-serializes losslessly
    Unknown(serde_json::Value),
}

/// Derived mirror of the recognized block variants. `ContentBlock` itself
/// needs hand-written serde so the unknown fallback can hold raw bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum TaggedBlock {
    Text {
        text: String,
    },
    Thinking {
        thinking: String,
        signature: String,
    },
    RedactedThinking {
        data: String,
    },
    ToolUse {
        id: ToolUseId,
        name: ToolName,
        input: serde_json::Value,
    },
    ToolResult {
        tool_use_id: ToolUseId,
        #[serde(skip_serializing_if = "Option::is_none")]
        content: Option<ContentValue>,
        #[serde(skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
}

/// Block type tags this crate recognizes
const KNOWN_BLOCK_TYPES: &[&str] = &[
    "text",
    "thinking",
    "redacted_thinking",
    "tool_use",
    "tool_result",
];

impl From<TaggedBlock> for ContentBlock {
    fn from(block: TaggedBlock) -> Self {
        match block {
            TaggedBlock::Text { text } => Self::Text { text },
            TaggedBlock::Thinking {
                thinking,
                signature,
            } => Self::Thinking {
                thinking,
                signature,
            },
            TaggedBlock::RedactedThinking { data } => Self::RedactedThinking { data },
            TaggedBlock::ToolUse { id, name, input } => Self::ToolUse { id, name, input },
            TaggedBlock::ToolResult {
                tool_use_id,
                content,
                is_error,
            } => Self::ToolResult {
                tool_use_id,
                content,
                is_error,
            },
        }
    }
}

impl ContentBlock {
    fn as_tagged(&self) -> Option<TaggedBlock> {
        match self {
            Self::Text { text } => Some(TaggedBlock::Text { text: text.clone() }),
            Self::Thinking {
                thinking,
                signature,
            } => Some(TaggedBlock::Thinking {
                thinking: thinking.clone(),
                signature: signature.clone(),
            }),
            Self::RedactedThinking { data } => {
                Some(TaggedBlock::RedactedThinking { data: data.clone() })
            }
            Self::ToolUse { id, name, input } => Some(TaggedBlock::ToolUse {
                id: id.clone(),
                name: name.clone(),
                input: input.clone(),
            }),
            Self::ToolResult {
                tool_use_id,
                content,
                is_error,
            } => Some(TaggedBlock::ToolResult {
                tool_use_id: tool_use_id.clone(),
                content: content.clone(),
                is_error: *is_error,
            }),
            Self::Unknown(_) => None,
        }
    }
}

impl Serialize for ContentBlock {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Unknown(value) => value.serialize(serializer),
            other => other
                .as_tagged()
                .expect("non-Unknown block maps to a tagged variant")
                .serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for ContentBlock {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        let tag = value.get("type").and_then(|t| t.as_str()).unwrap_or("");
        if KNOWN_BLOCK_TYPES.contains(&tag) {
            serde_json::from_value::<TaggedBlock>(value)
                .map(Into::into)
                .map_err(D::Error::custom)
        } else {
            Ok(Self::Unknown(value))
        }
    }
}

/// User message content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserMessageContent {
    /// Message role (always "user")
    pub role: String,
    /// Message content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<UserContent>,
}

/// User content can be string or blocks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserContent {
    /// Plain string content
    String(String),
    /// Structured content blocks
    Blocks(Vec<ContentBlock>),
}

/// Assistant message content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantMessageContent {
    /// Model that generated the message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Message content blocks, in emission order
    pub content: Vec<ContentBlock>,
}

/// Messages arriving from the agent process, one per wire line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    /// User message (echoed back, or replayed on resume)
    User {
        /// Message content
        message: UserMessageContent,
        /// Message UUID
        #[serde(skip_serializing_if = "Option::is_none")]
        uuid: Option<String>,
        /// Session ID
        #[serde(skip_serializing_if = "Option::is_none")]
        session_id: Option<SessionId>,
        /// Parent tool use ID for nested conversations
        #[serde(skip_serializing_if = "Option::is_none")]
        parent_tool_use_id: Option<ToolUseId>,
    },
    /// Assistant message
    Assistant {
        /// Message content
        message: AssistantMessageContent,
        /// Message UUID
        #[serde(skip_serializing_if = "Option::is_none")]
        uuid: Option<String>,
        /// Session ID
        #[serde(skip_serializing_if = "Option::is_none")]
        session_id: Option<SessionId>,
        /// Parent tool use ID for nested conversations
        #[serde(skip_serializing_if = "Option::is_none")]
        parent_tool_use_id: Option<ToolUseId>,
        /// Error description when the message failed mid-generation
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    /// System message
    System {
        /// System message subtype
        subtype: String,
        /// Session ID
        #[serde(skip_serializing_if = "Option::is_none")]
        session_id: Option<SessionId>,
        /// Additional system message data
        #[serde(flatten)]
        data: serde_json::Value,
    },
    /// Terminal result message ending a turn, with metrics
    Result {
        /// Result subtype ("success" or an error subtype)
        subtype: String,
        /// Message UUID
        #[serde(skip_serializing_if = "Option::is_none")]
        uuid: Option<String>,
        /// Session ID
        #[serde(skip_serializing_if = "Option::is_none")]
        session_id: Option<SessionId>,
        /// Whether this is an error result
        #[serde(default)]
        is_error: bool,
        /// Total duration in milliseconds
        #[serde(skip_serializing_if = "Option::is_none")]
        duration_ms: Option<u64>,
        /// API call duration in milliseconds
        #[serde(skip_serializing_if = "Option::is_none")]
        duration_api_ms: Option<u64>,
        /// Number of conversation turns
        #[serde(skip_serializing_if = "Option::is_none")]
        num_turns: Option<u32>,
        /// Total cost in USD
        #[serde(skip_serializing_if = "Option::is_none")]
        total_cost_usd: Option<f64>,
        /// Token usage statistics
        #[serde(skip_serializing_if = "Option::is_none")]
        usage: Option<serde_json::Value>,
        /// Result text
        #[serde(skip_serializing_if = "Option::is_none")]
        result: Option<String>,
        /// Validated structured output, when an output schema was configured
        #[serde(
            skip_serializing_if = "Option::is_none",
            alias = "structuredOutput"
        )]
        structured_output: Option<serde_json::Value>,
    },
    /// Out-of-band permission request for a pending tool use
    PermissionRequest {
        /// Tool use being gated
        tool_use_id: ToolUseId,
        /// Tool name
        tool_name: ToolName,
        /// Tool input parameters
        tool_input: serde_json::Value,
        /// Session ID
        #[serde(skip_serializing_if = "Option::is_none")]
        session_id: Option<SessionId>,
    },
    /// Question surfaced for the human operator
    UserQuestion {
        /// Question text
        question: String,
        /// Session ID
        #[serde(skip_serializing_if = "Option::is_none")]
        session_id: Option<SessionId>,
        /// Additional question data (choices, defaults)
        #[serde(flatten)]
        data: serde_json::Value,
    },
    /// Stream event carrying a partial-message fragment
    StreamEvent {
        /// Event UUID
        uuid: String,
        /// Session ID
        session_id: SessionId,
        /// Raw stream event data
        event: serde_json::Value,
        /// Parent tool use ID
        #[serde(skip_serializing_if = "Option::is_none")]
        parent_tool_use_id: Option<ToolUseId>,
    },
    /// Control request from the process, answered by the control bridge
    ControlRequest {
        /// Correlation ID; the response echoes it
        request_id: RequestId,
        /// Inner request payload
        request: ControlRequestInner,
    },
    /// Acknowledgment of a control request this side sent; opaque
    ControlResponse {
        /// Raw response payload
        response: serde_json::Value,
    },
}

impl Message {
    /// Whether this message terminates a turn
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Result { .. })
    }

    /// Whether this is a terminal result with subtype "success"
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Result { subtype, .. } if subtype == "success")
    }

    /// Session ID carried by this message, if any
    #[must_use]
    pub fn session_id(&self) -> Option<&SessionId> {
        match self {
            Self::User { session_id, .. }
            | Self::Assistant { session_id, .. }
            | Self::System { session_id, .. }
            | Self::Result { session_id, .. }
            | Self::PermissionRequest { session_id, .. }
            | Self::UserQuestion { session_id, .. } => session_id.as_ref(),
            Self::StreamEvent { session_id, .. } => Some(session_id),
            Self::ControlRequest { .. } | Self::ControlResponse { .. } => None,
        }
    }
}

/// Messages this side writes to the process, one JSON line each
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// User prompt
    User {
        /// Message content
        message: UserMessageContent,
        /// Session ID to address, once known
        #[serde(skip_serializing_if = "Option::is_none")]
        session_id: Option<SessionId>,
    },
    /// Best-effort interruption of the in-flight turn
    Interrupt,
    /// Answer to an out-of-band permission request
    PermissionResponse {
        /// Tool use being answered
        tool_use_id: ToolUseId,
        /// Whether the tool use may proceed
        allow: bool,
        /// Human-readable reason, mainly for denials
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    /// Rewind tracked files to their state at a user message
    RewindFiles {
        /// UUID of the user message to rewind to
        user_message_uuid: String,
    },
    /// Control request initiated by this side
    ControlRequest {
        /// Correlation ID echoed by the eventual acknowledgment
        request_id: RequestId,
        /// Request payload
        request: OutboundControlRequest,
    },
    /// Response to a control request the process sent
    ControlResponse {
        /// Response payload
        response: ControlResponsePayload,
    },
}

impl OutboundMessage {
    /// Build a plain-text user message
    pub fn user_text(content: impl Into<String>, session_id: Option<SessionId>) -> Self {
        Self::User {
            message: UserMessageContent {
                role: "user".to_string(),
                content: Some(UserContent::String(content.into())),
            },
            session_id,
        }
    }
}
