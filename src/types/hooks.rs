//! Hook-related type definitions
//!
//! Hooks observe and can veto lifecycle and tool-use events. Each firing
//! receives a typed [`HookInput`] whose event-specific fields are only set
//! when the event actually carries them.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use super::identifiers::{SessionId, ToolName, ToolUseId};
use crate::error::Result;

/// Hook event types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HookEvent {
    /// Before a tool is used; a Block decision denies the tool
    PreToolUse,
    /// After a tool returned successfully
    PostToolUse,
    /// After a tool returned an error result
    PostToolUseFailure,
    /// A permission check ran; observational only
    PermissionObserved,
    /// When the user submits a prompt
    UserPromptSubmit,
    /// When a turn ends with a terminal result
    Stop,
    /// When a subagent is spawned
    SubagentStart,
    /// When a subagent finishes
    SubagentStop,
    /// When the session starts
    SessionStart,
    /// When the session ends
    SessionEnd,
    /// When the process emits a notification
    Notification,
    /// Before compacting the conversation
    PreCompact,
}

impl HookEvent {
    /// Wire name as it appears in `hook_event_name`
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PreToolUse => "PreToolUse",
            Self::PostToolUse => "PostToolUse",
            Self::PostToolUseFailure => "PostToolUseFailure",
            Self::PermissionObserved => "PermissionObserved",
            Self::UserPromptSubmit => "UserPromptSubmit",
            Self::Stop => "Stop",
            Self::SubagentStart => "SubagentStart",
            Self::SubagentStop => "SubagentStop",
            Self::SessionStart => "SessionStart",
            Self::SessionEnd => "SessionEnd",
            Self::Notification => "Notification",
            Self::PreCompact => "PreCompact",
        }
    }

    /// Parse a wire name back into an event
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "PreToolUse" => Some(Self::PreToolUse),
            "PostToolUse" => Some(Self::PostToolUse),
            "PostToolUseFailure" => Some(Self::PostToolUseFailure),
            "PermissionObserved" => Some(Self::PermissionObserved),
            "UserPromptSubmit" => Some(Self::UserPromptSubmit),
            "Stop" => Some(Self::Stop),
            "SubagentStart" => Some(Self::SubagentStart),
            "SubagentStop" => Some(Self::SubagentStop),
            "SessionStart" => Some(Self::SessionStart),
            "SessionEnd" => Some(Self::SessionEnd),
            "Notification" => Some(Self::Notification),
            "PreCompact" => Some(Self::PreCompact),
            _ => None,
        }
    }
}

/// Typed input delivered to every hook callback
///
/// Fields irrelevant to the firing event stay `None`; they are never
/// defaulted to sentinel values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HookInput {
    /// Event being fired
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hook_event_name: Option<String>,
    /// Session the event belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    /// Path to the transcript file, when the process reported one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript_path: Option<String>,
    /// Working directory of the agent process
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
    /// Permission mode in effect
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission_mode: Option<String>,

    /// Tool name, for tool-scoped events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<ToolName>,
    /// Tool input, for tool-scoped events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_input: Option<serde_json::Value>,
    /// Tool use ID, for tool-scoped events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_use_id: Option<ToolUseId>,
    /// Tool result content, for post-tool-use events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_response: Option<serde_json::Value>,

    /// Error description, for failure events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Whether the failure was an interrupt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_interrupt: Option<bool>,

    /// Notification message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_message: Option<String>,
    /// Notification title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_title: Option<String>,
    /// What triggered a compaction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
    /// How the session started (startup, resume, clear)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Why the session ended
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_end_reason: Option<String>,
    /// Submitted prompt text, for prompt events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

impl HookInput {
    /// Empty input stamped with the given event name
    #[must_use]
    pub fn for_event(event: HookEvent) -> Self {
        Self {
            hook_event_name: Some(event.as_str().to_string()),
            ..Self::default()
        }
    }
}

/// Hook decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HookDecision {
    /// Block the action
    Block,
}

/// Hook output
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HookOutput {
    /// Decision to block the action; `None` lets it proceed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<HookDecision>,
    /// Human-readable reason, mainly for blocks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// System message to add
    #[serde(skip_serializing_if = "Option::is_none", rename = "systemMessage")]
    pub system_message: Option<String>,
    /// Hook-specific output data
    #[serde(skip_serializing_if = "Option::is_none", rename = "hookSpecificOutput")]
    pub hook_specific_output: Option<serde_json::Value>,
}

impl HookOutput {
    /// Output that blocks the action with a reason
    pub fn block(reason: impl Into<String>) -> Self {
        Self {
            decision: Some(HookDecision::Block),
            reason: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Whether this output blocks the action
    #[must_use]
    pub const fn is_block(&self) -> bool {
        matches!(self.decision, Some(HookDecision::Block))
    }
}

/// Context for hook callbacks
#[derive(Debug, Clone, Default)]
pub struct HookContext {
    // Future: abort signal support
}

/// Hook callback type
pub type HookCallback = Arc<
    dyn Fn(HookInput, HookContext) -> Pin<Box<dyn Future<Output = Result<HookOutput>> + Send>>
        + Send
        + Sync,
>;

/// Hook matcher configuration
#[derive(Clone)]
pub struct HookMatcher {
    /// Matcher pattern (e.g. tool name "Bash" or pattern "Write|Edit")
    pub matcher: Option<String>,
    /// List of hook callbacks, invoked in registration order
    pub hooks: Vec<HookCallback>,
}

impl std::fmt::Debug for HookMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookMatcher")
            .field("matcher", &self.matcher)
            .field("hooks", &format!("[{} callbacks]", self.hooks.len()))
            .finish()
    }
}
