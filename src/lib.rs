//! # claude-bridge
//!
//! A typed, event-driven bridge for driving a long-lived Claude Code agent
//! process over its line-delimited stream-json protocol. The bridge owns
//! the subprocess, decodes every output line into a tagged message, answers
//! the process's control requests (in-process tool calls, permission
//! checks, hook callbacks), and exposes turn-taking as an async API.
//!
//! ## Quick Start
//!
//! One-shot queries go through [`query()`]:
//!
//! ```no_run
//! use claude_bridge::{query, Message};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let stream = query("What is 2 + 2?", None).await?;
//!     let mut stream = Box::pin(stream);
//!
//!     while let Some(message) = stream.next().await {
//!         if let Message::Assistant { message, .. } = message? {
//!             log::info!("Claude: {:?}", message.content);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Interactive sessions
//!
//! [`BridgeClient`] holds a stateful, bidirectional session:
//!
//! ```no_run
//! # use claude_bridge::{BridgeClient, BridgeOptions, Message};
//! # use futures::StreamExt;
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let options = BridgeOptions::builder().max_turns(10).build();
//! let mut client = BridgeClient::start(options, None).await?;
//!
//! client.query("Hello!").await?;
//! {
//!     let mut responses = std::pin::pin!(client.response_stream());
//!     while let Some(message) = responses.next().await {
//!         // Control traffic is already filtered out; the stream ends
//!         // after the terminal result message.
//!         println!("{:?}", message?);
//!     }
//! }
//!
//! client.stop().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## In-process tools
//!
//! Tools registered on an [`SdkMcpServer`](mcp::SdkMcpServer) run inside
//! your process; the agent reaches them over the control channel:
//!
//! ```no_run
//! # use claude_bridge::mcp::{SdkMcpServer, SdkTool, ToolResult};
//! # use serde_json::json;
//! let calculator = SdkMcpServer::new("calculator")
//!     .version("1.0.0")
//!     .tool(SdkTool::new(
//!         "add",
//!         "Add two numbers",
//!         json!({"type": "object", "properties": {
//!             "a": {"type": "number"},
//!             "b": {"type": "number"}
//!         }}),
//!         |input| async move {
//!             let sum = input["a"].as_f64().unwrap_or(0.0)
//!                     + input["b"].as_f64().unwrap_or(0.0);
//!             Ok(ToolResult::text(sum.to_string()))
//!         },
//!     ));
//! ```
//!
//! ## Hooks and permissions
//!
//! Hook callbacks fire at lifecycle and tool-use events and can veto
//! pending tool uses; an optional permission callback decides in-band
//! `can_use_tool` checks. See [`hooks`] and [`permissions`].
//!
//! ## Architecture
//!
//! - [`types`]: wire message models, identifiers, options
//! - [`message`]: line decoding
//! - [`transport`]: subprocess spawning and the background reader
//! - [`mcp`]: in-process tool servers
//! - [`control`]: the control-request bridge
//! - [`hooks`]: hook registration and the interception pipeline
//! - [`permissions`]: permission evaluation
//! - [`client`]: the session facade
//! - [`error`]: error types
//!
//! ## Error Handling
//!
//! Fatal conditions (missing binary, broken pipe) surface as typed
//! [`BridgeError`] values at start or send time. A malformed output line is
//! logged and skipped; the session continues.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod control;
pub mod error;
pub mod hooks;
pub mod mcp;
pub mod message;
pub mod permissions;
pub mod query;
pub mod transport;
pub mod types;

// Re-export commonly used types for external API
pub use client::BridgeClient;
pub use error::{BridgeError, Result};
pub use hooks::{HookManager, HookMatcherBuilder, HookPipeline};
pub use message::{decode_line, parse_message};
pub use permissions::PermissionManager;
pub use query::query;
pub use transport::{PromptInput, SubprocessTransport, Transport};

pub use types::hooks::{
    HookCallback, HookContext, HookDecision, HookEvent, HookInput, HookMatcher, HookOutput,
};
pub use types::identifiers::{RequestId, SessionId, ToolName, ToolUseId};
pub use types::mcp::{
    McpHttpServerConfig, McpServerConfig, McpServers, McpStdioServerConfig,
    McpStreamableHttpConfig,
};
pub use types::messages::{ContentBlock, ContentValue, Message, OutboundMessage, UserContent};
pub use types::options::{BridgeOptions, BridgeOptionsBuilder, SystemPrompt};
pub use types::permissions::{
    CanUseToolCallback, PermissionMode, PermissionResult, PermissionResultAllow,
    PermissionResultDeny, PermissionRuleValue, PermissionUpdate, PermissionUpdateDestination,
    SettingSource, ToolPermissionContext,
};

/// Version of the bridge
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
