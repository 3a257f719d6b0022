//! Bridge options and configuration
//!
//! Configuration for a bridge session, with a builder for the common paths.
//! Everything here is translated into CLI flags at spawn time except the
//! callbacks and in-process servers, which stay on this side of the pipe.

use std::collections::HashMap;
use std::path::PathBuf;

use super::hooks::{HookEvent, HookMatcher};
use super::identifiers::{SessionId, ToolName};
use super::mcp::{McpServerConfig, McpServers};
use super::permissions::{CanUseToolCallback, PermissionMode, SettingSource};
use crate::mcp::SdkMcpServer;

/// System prompt configuration
#[derive(Debug, Clone)]
pub enum SystemPrompt {
    /// Replace the process's system prompt
    Replace(String),
    /// Append to the process's preset system prompt
    Append(String),
}

impl From<String> for SystemPrompt {
    fn from(s: String) -> Self {
        Self::Replace(s)
    }
}

impl From<&str> for SystemPrompt {
    fn from(s: &str) -> Self {
        Self::Replace(s.to_string())
    }
}

/// Main options for a bridge session
#[derive(Clone, Default)]
pub struct BridgeOptions {
    /// List of tools the agent is allowed to use
    pub allowed_tools: Vec<ToolName>,
    /// List of tools the agent is not allowed to use
    pub disallowed_tools: Vec<ToolName>,
    /// System prompt configuration
    pub system_prompt: Option<SystemPrompt>,
    /// External MCP server configurations
    pub mcp_servers: McpServers,
    /// In-process tool servers, keyed by name
    pub sdk_mcp_servers: HashMap<String, SdkMcpServer>,
    /// Permission mode for tool execution
    pub permission_mode: Option<PermissionMode>,
    /// Whether to continue from the previous conversation
    pub continue_conversation: bool,
    /// Session ID to resume from
    pub resume: Option<SessionId>,
    /// Whether to fork the session when resuming
    pub fork_session: bool,
    /// Maximum number of turns before stopping
    pub max_turns: Option<u32>,
    /// AI model to use
    pub model: Option<String>,
    /// Tool name to use for permission prompts
    pub permission_prompt_tool_name: Option<String>,
    /// Working directory for the agent process
    pub cwd: Option<PathBuf>,
    /// Path to settings file
    pub settings: Option<PathBuf>,
    /// Additional directories to add to the context
    pub add_dirs: Vec<PathBuf>,
    /// Environment variables for the agent process
    pub env: HashMap<String, String>,
    /// Extra CLI arguments to pass (allowlisted)
    pub extra_args: HashMap<String, Option<String>>,
    /// Maximum length of one wire line (default: 1MB)
    pub max_buffer_size: Option<usize>,
    /// Capacity of the inbound message queue (default: 256)
    pub channel_capacity: Option<usize>,
    /// Callback for tool permission checks
    pub can_use_tool: Option<CanUseToolCallback>,
    /// Hook configurations
    pub hooks: Option<HashMap<HookEvent, Vec<HookMatcher>>>,
    /// Whether to include partial messages in the stream
    pub include_partial_messages: bool,
    /// Maximum thinking tokens
    pub max_thinking_tokens: Option<u32>,
    /// JSON Schema the terminal result's structured output must match
    pub output_schema: Option<serde_json::Value>,
    /// Tool name whose use/result pairs mark subagent lifecycles
    /// (default: "Task")
    pub subagent_tool: Option<ToolName>,
    /// Setting sources to load
    pub setting_sources: Option<Vec<SettingSource>>,
}

impl BridgeOptions {
    /// Create a new builder
    #[must_use]
    pub fn builder() -> BridgeOptionsBuilder {
        BridgeOptionsBuilder::default()
    }

    /// Tool name used for subagent lifecycle inference
    #[must_use]
    pub fn subagent_tool(&self) -> ToolName {
        self.subagent_tool
            .clone()
            .unwrap_or_else(|| ToolName::new("Task"))
    }
}

impl std::fmt::Debug for BridgeOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeOptions")
            .field("allowed_tools", &self.allowed_tools)
            .field("disallowed_tools", &self.disallowed_tools)
            .field("system_prompt", &self.system_prompt)
            .field("mcp_servers", &self.mcp_servers)
            .field(
                "sdk_mcp_servers",
                &self.sdk_mcp_servers.keys().collect::<Vec<_>>(),
            )
            .field("permission_mode", &self.permission_mode)
            .field("continue_conversation", &self.continue_conversation)
            .field("resume", &self.resume)
            .field("fork_session", &self.fork_session)
            .field("max_turns", &self.max_turns)
            .field("model", &self.model)
            .field(
                "permission_prompt_tool_name",
                &self.permission_prompt_tool_name,
            )
            .field("cwd", &self.cwd)
            .field("settings", &self.settings)
            .field("add_dirs", &self.add_dirs)
            .field("env", &self.env)
            .field("extra_args", &self.extra_args)
            .field("max_buffer_size", &self.max_buffer_size)
            .field("channel_capacity", &self.channel_capacity)
            .field(
                "can_use_tool",
                &self.can_use_tool.as_ref().map(|_| "<callback>"),
            )
            .field(
                "hooks",
                &self
                    .hooks
                    .as_ref()
                    .map(|h| format!("[{} hook types]", h.len())),
            )
            .field("include_partial_messages", &self.include_partial_messages)
            .field("max_thinking_tokens", &self.max_thinking_tokens)
            .field("output_schema", &self.output_schema)
            .field("subagent_tool", &self.subagent_tool)
            .field("setting_sources", &self.setting_sources)
            .finish()
    }
}

/// Builder for [`BridgeOptions`]
#[derive(Debug, Default)]
pub struct BridgeOptionsBuilder {
    options: BridgeOptions,
}

impl BridgeOptionsBuilder {
    /// Set allowed tools
    #[must_use]
    pub fn allowed_tools(mut self, tools: Vec<impl Into<ToolName>>) -> Self {
        self.options.allowed_tools = tools.into_iter().map(Into::into).collect();
        self
    }

    /// Add an allowed tool
    #[must_use]
    pub fn add_allowed_tool(mut self, tool: impl Into<ToolName>) -> Self {
        self.options.allowed_tools.push(tool.into());
        self
    }

    /// Set disallowed tools
    #[must_use]
    pub fn disallowed_tools(mut self, tools: Vec<impl Into<ToolName>>) -> Self {
        self.options.disallowed_tools = tools.into_iter().map(Into::into).collect();
        self
    }

    /// Set system prompt
    #[must_use]
    pub fn system_prompt(mut self, prompt: impl Into<SystemPrompt>) -> Self {
        self.options.system_prompt = Some(prompt.into());
        self
    }

    /// Set external MCP servers
    #[must_use]
    pub fn mcp_servers(mut self, servers: HashMap<String, McpServerConfig>) -> Self {
        self.options.mcp_servers = McpServers::Dict(servers);
        self
    }

    /// Register an in-process tool server
    #[must_use]
    pub fn sdk_mcp_server(mut self, server: SdkMcpServer) -> Self {
        self.options
            .sdk_mcp_servers
            .insert(server.name.clone(), server);
        self
    }

    /// Set permission mode
    #[must_use]
    pub const fn permission_mode(mut self, mode: PermissionMode) -> Self {
        self.options.permission_mode = Some(mode);
        self
    }

    /// Set max turns
    ///
    /// # Panics
    /// Panics if turns exceeds 1000
    #[must_use]
    pub fn max_turns(mut self, turns: u32) -> Self {
        const MAX_ALLOWED_TURNS: u32 = 1000;
        assert!(
            turns <= MAX_ALLOWED_TURNS,
            "max_turns {turns} exceeds maximum allowed: {MAX_ALLOWED_TURNS}"
        );
        self.options.max_turns = Some(turns);
        self
    }

    /// Set the model
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.options.model = Some(model.into());
        self
    }

    /// Set working directory
    #[must_use]
    pub fn cwd(mut self, path: impl Into<PathBuf>) -> Self {
        self.options.cwd = Some(path.into());
        self
    }

    /// Resume a previous session
    #[must_use]
    pub fn resume(mut self, session_id: impl Into<SessionId>) -> Self {
        self.options.resume = Some(session_id.into());
        self
    }

    /// Include partial-message stream events
    #[must_use]
    pub const fn include_partial_messages(mut self, include: bool) -> Self {
        self.options.include_partial_messages = include;
        self
    }

    /// Set the structured output schema
    #[must_use]
    pub fn output_schema(mut self, schema: serde_json::Value) -> Self {
        self.options.output_schema = Some(schema);
        self
    }

    /// Set the `can_use_tool` callback
    #[must_use]
    pub fn can_use_tool(mut self, callback: CanUseToolCallback) -> Self {
        self.options.can_use_tool = Some(callback);
        self
    }

    /// Set hooks
    #[must_use]
    pub fn hooks(mut self, hooks: HashMap<HookEvent, Vec<HookMatcher>>) -> Self {
        self.options.hooks = Some(hooks);
        self
    }

    /// Add hook matchers for one event
    #[must_use]
    pub fn add_hooks(mut self, event: HookEvent, matchers: Vec<HookMatcher>) -> Self {
        self.options
            .hooks
            .get_or_insert_with(HashMap::new)
            .entry(event)
            .or_default()
            .extend(matchers);
        self
    }

    /// Build the options
    #[must_use]
    pub fn build(self) -> BridgeOptions {
        self.options
    }
}
