//! CLI command building logic for subprocess transport

use std::collections::HashMap;
use tokio::process::Command;

use crate::types::mcp::{McpServerConfig, McpServers};
use crate::types::options::{BridgeOptions, SystemPrompt};
use crate::types::permissions::SettingSource;

use super::config::{ALLOWED_EXTRA_FLAGS, PromptInput};

/// Command builder for the agent CLI
pub struct CommandBuilder<'a> {
    cli_path: &'a std::path::Path,
    prompt: &'a PromptInput,
    options: &'a BridgeOptions,
}

impl<'a> CommandBuilder<'a> {
    /// Create a new command builder
    pub fn new(
        cli_path: &'a std::path::Path,
        prompt: &'a PromptInput,
        options: &'a BridgeOptions,
    ) -> Self {
        Self {
            cli_path,
            prompt,
            options,
        }
    }

    /// Build the complete CLI command with all arguments
    pub fn build(&self) -> Command {
        let mut cmd = Command::new(self.cli_path);

        // Protocol-establishing base arguments
        cmd.arg("--print")
            .arg("--output-format")
            .arg("stream-json")
            .arg("--verbose");

        if let Some(ref system_prompt) = self.options.system_prompt {
            match system_prompt {
                SystemPrompt::Replace(s) => {
                    cmd.arg("--system-prompt").arg(s);
                }
                SystemPrompt::Append(s) => {
                    cmd.arg("--append-system-prompt").arg(s);
                }
            }
        }

        self.add_tool_args(&mut cmd);
        self.add_configuration_args(&mut cmd);
        self.add_session_args(&mut cmd);
        self.add_mcp_args(&mut cmd);
        self.add_extra_args(&mut cmd);

        // Prompt handling based on mode
        match self.prompt {
            PromptInput::Stream => {
                cmd.arg("--input-format").arg("stream-json");
            }
            PromptInput::String(s) => {
                cmd.arg("--").arg(s);
            }
        }

        cmd
    }

    /// Add tool-related arguments
    fn add_tool_args(&self, cmd: &mut Command) {
        if !self.options.allowed_tools.is_empty() {
            let tools: Vec<&str> = self
                .options
                .allowed_tools
                .iter()
                .map(|t| t.as_str())
                .collect();
            cmd.arg("--allowedTools").arg(tools.join(","));
        }

        if !self.options.disallowed_tools.is_empty() {
            let tools: Vec<&str> = self
                .options
                .disallowed_tools
                .iter()
                .map(|t| t.as_str())
                .collect();
            cmd.arg("--disallowedTools").arg(tools.join(","));
        }
    }

    /// Add configuration arguments (model, max turns, permissions, output)
    fn add_configuration_args(&self, cmd: &mut Command) {
        if let Some(max_turns) = self.options.max_turns {
            cmd.arg("--max-turns").arg(max_turns.to_string());
        }

        if let Some(ref model) = self.options.model {
            cmd.arg("--model").arg(model);
        }

        if let Some(ref tool) = self.options.permission_prompt_tool_name {
            cmd.arg("--permission-prompt-tool").arg(tool);
        }

        if let Some(ref mode) = self.options.permission_mode {
            cmd.arg("--permission-mode").arg(mode.as_str());
        }

        if let Some(tokens) = self.options.max_thinking_tokens {
            cmd.arg("--max-thinking-tokens").arg(tokens.to_string());
        }

        if let Some(ref schema) = self.options.output_schema {
            cmd.arg("--structured-output-schema").arg(schema.to_string());
        }
    }

    /// Add session-related arguments
    fn add_session_args(&self, cmd: &mut Command) {
        if self.options.continue_conversation {
            cmd.arg("--continue");
        }

        if let Some(ref session_id) = self.options.resume {
            cmd.arg("--resume").arg(session_id.as_str());
        }

        if let Some(ref settings) = self.options.settings {
            cmd.arg("--settings").arg(settings);
        }

        for dir in &self.options.add_dirs {
            cmd.arg("--add-dir").arg(dir);
        }

        if self.options.include_partial_messages {
            cmd.arg("--include-partial-messages");
        }

        if self.options.fork_session {
            cmd.arg("--fork-session");
        }
    }

    /// Add MCP server configuration
    ///
    /// In-process sdk servers join the manifest as `{"type":"sdk"}` entries
    /// so the process routes their traffic back over the control channel.
    fn add_mcp_args(&self, cmd: &mut Command) {
        let mut config_map = HashMap::new();

        if let McpServers::Dict(ref servers) = self.options.mcp_servers {
            for (name, config) in servers {
                config_map.insert(name.clone(), serialize_mcp_config(config));
            }
        }
        for name in self.options.sdk_mcp_servers.keys() {
            config_map.insert(
                name.clone(),
                serde_json::json!({ "type": "sdk", "name": name }),
            );
        }

        if !config_map.is_empty() {
            let config_json = serde_json::json!({
                "mcpServers": config_map
            });
            cmd.arg("--mcp-config").arg(config_json.to_string());
        } else if let McpServers::Path(ref path) = self.options.mcp_servers {
            cmd.arg("--mcp-config").arg(path);
        }
    }

    /// Add setting sources and extra arguments
    fn add_extra_args(&self, cmd: &mut Command) {
        if let Some(ref sources) = self.options.setting_sources {
            let sources_str: Vec<&str> = sources
                .iter()
                .map(|s| match s {
                    SettingSource::User => "user",
                    SettingSource::Project => "project",
                    SettingSource::Local => "local",
                })
                .collect();
            cmd.arg("--setting-sources").arg(sources_str.join(","));
        } else {
            cmd.arg("--setting-sources").arg("");
        }

        for (flag, value) in &self.options.extra_args {
            if ALLOWED_EXTRA_FLAGS.contains(&flag.as_str()) {
                if let Some(v) = value {
                    cmd.arg(format!("--{flag}")).arg(v);
                } else {
                    cmd.arg(format!("--{flag}"));
                }
            }
        }
    }
}

/// Serialize an external MCP config entry for the manifest
fn serialize_mcp_config(config: &McpServerConfig) -> serde_json::Value {
    match config {
        McpServerConfig::Stdio(stdio) => {
            let mut obj = serde_json::json!({
                "command": stdio.command,
            });
            if let Some(ref args) = stdio.args {
                obj["args"] = serde_json::json!(args);
            }
            if let Some(ref env) = stdio.env {
                obj["env"] = serde_json::json!(env);
            }
            if let Some(ref server_type) = stdio.server_type {
                obj["type"] = serde_json::json!(server_type);
            }
            obj
        }
        McpServerConfig::StreamableHttp(streamable_http) => {
            serde_json::json!({
                "type": streamable_http.server_type,
                "url": streamable_http.url,
                "headers": streamable_http.headers,
            })
        }
        McpServerConfig::Http(http) => {
            serde_json::json!({
                "type": http.server_type,
                "url": http.url,
                "headers": http.headers,
            })
        }
        McpServerConfig::Sdk(sdk) => {
            serde_json::json!({
                "type": "sdk",
                "name": sdk.name,
            })
        }
    }
}
