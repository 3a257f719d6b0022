//! [`BridgeClient`] construction and public API

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::Utc;
use futures::Stream;
use tokio::sync::{Mutex, mpsc};

use crate::control::{ControlBridge, OutboundControlRequest};
use crate::error::Result;
use crate::hooks::{HookManager, HookPipeline};
use crate::permissions::PermissionManager;
use crate::transport::subprocess::DEFAULT_CHANNEL_CAPACITY;
use crate::transport::{PromptInput, SubprocessTransport, Transport};
use crate::types::identifiers::{RequestId, SessionId, ToolUseId};
use crate::types::messages::{Message, OutboundMessage};
use crate::types::options::BridgeOptions;
use crate::types::permissions::PermissionMode;

impl super::BridgeClient {
    /// Start a session: spawn the agent process, fire session-start hooks,
    /// and announce any registered in-process tool servers
    ///
    /// # Arguments
    /// * `options` - Configuration options
    /// * `cli_path` - Optional path to the agent CLI
    ///
    /// # Errors
    /// Returns error if the CLI cannot be found or the process fails to
    /// start
    pub async fn start(
        options: BridgeOptions,
        cli_path: Option<std::path::PathBuf>,
    ) -> Result<Self> {
        let hook_manager = options
            .hooks
            .as_ref()
            .map(|config| HookManager::from_config(config.clone()))
            .unwrap_or_default();

        let mut permission_manager = PermissionManager::new();
        if let Some(callback) = options.can_use_tool.clone() {
            permission_manager.set_callback(callback);
        }
        permission_manager.set_allowed_tools(Some(options.allowed_tools.clone()));
        permission_manager.set_disallowed_tools(options.disallowed_tools.clone());

        let mode = options.permission_mode.unwrap_or(PermissionMode::Default);
        let pipeline = Arc::new(HookPipeline::new(
            hook_manager,
            permission_manager,
            mode,
            options.subagent_tool(),
            options
                .cwd
                .as_ref()
                .map(|p| p.to_string_lossy().to_string()),
        ));

        let bridge = ControlBridge::new(options.sdk_mcp_servers.clone(), pipeline.clone());
        let server_names = bridge.server_names();
        let channel_capacity = options
            .channel_capacity
            .unwrap_or(DEFAULT_CHANNEL_CAPACITY);
        let source = if options.resume.is_some() {
            "resume"
        } else {
            "startup"
        };

        let mut transport = SubprocessTransport::new(PromptInput::Stream, options, cli_path)?;
        transport.connect().await?;
        let inbound = transport.read_messages();

        let transport = Arc::new(Mutex::new(transport));
        let session_id = Arc::new(parking_lot::Mutex::new(None));
        let (message_tx, message_rx) = mpsc::channel(channel_capacity);

        tokio::spawn(Self::dispatch_task(
            transport.clone(),
            pipeline.clone(),
            bridge,
            inbound,
            message_tx,
            session_id.clone(),
        ));

        let client = Self {
            transport,
            pipeline,
            message_rx,
            next_request_id: AtomicU64::new(1),
            session_id,
            started_at: Utc::now(),
            stopped: false,
        };

        client.pipeline.on_session_start(source).await;

        if !server_names.is_empty() {
            let request_id = client.next_request_id();
            client
                .send_outbound(&OutboundMessage::ControlRequest {
                    request_id,
                    request: OutboundControlRequest::Initialize {
                        sdk_mcp_servers: server_names,
                    },
                })
                .await?;
        }

        Ok(client)
    }

    fn next_request_id(&self) -> RequestId {
        let n = self.next_request_id.fetch_add(1, Ordering::SeqCst);
        let nonce = uuid::Uuid::new_v4().simple().to_string();
        RequestId::new(format!("req-{n}-{}", &nonce[..8]))
    }

    async fn send_outbound(&self, message: &OutboundMessage) -> Result<()> {
        let mut transport = self.transport.lock().await;
        transport.send(message).await
    }

    /// Send a user prompt, firing user-prompt-submit hooks first
    ///
    /// # Errors
    /// Returns error if the message cannot be written
    pub async fn query(&self, prompt: impl Into<String>) -> Result<()> {
        let prompt = prompt.into();
        self.pipeline.on_user_prompt(&prompt).await;
        let message = OutboundMessage::user_text(prompt, self.session_id());
        self.send_outbound(&message).await
    }

    /// Alias for [`query`](Self::query), matching the wire vocabulary
    ///
    /// # Errors
    /// Returns error if the message cannot be written
    pub async fn send_user_message(&self, content: impl Into<String>) -> Result<()> {
        self.query(content).await
    }

    /// Get the next message from the stream
    ///
    /// Control traffic is handled internally and never appears here.
    /// Returns `None` when the stream ends.
    pub async fn next_message(&mut self) -> Option<Result<Message>> {
        self.message_rx.recv().await
    }

    /// Get the next message, giving up after `timeout`
    ///
    /// Returns `None` both on timeout and at end of stream; a quiet interval
    /// is not an error.
    pub async fn try_next_message(&mut self, timeout: Duration) -> Option<Result<Message>> {
        tokio::time::timeout(timeout, self.message_rx.recv())
            .await
            .ok()
            .flatten()
    }

    /// Stream responses for the current turn
    ///
    /// Yields every non-control message in arrival order and finishes after
    /// the terminal result message.
    pub fn response_stream(&mut self) -> impl Stream<Item = Result<Message>> + '_ {
        async_stream::stream! {
            while let Some(item) = self.message_rx.recv().await {
                let terminal = matches!(&item, Ok(message) if message.is_terminal());
                yield item;
                if terminal {
                    break;
                }
            }
        }
    }

    /// Send a best-effort interrupt for the in-flight turn
    ///
    /// Does not wait for acknowledgment.
    ///
    /// # Errors
    /// Returns error if the message cannot be written
    pub async fn interrupt(&self) -> Result<()> {
        self.send_outbound(&OutboundMessage::Interrupt).await
    }

    /// Switch the permission mode for the rest of the session
    ///
    /// # Errors
    /// Returns error if the message cannot be written
    pub async fn set_permission_mode(&self, mode: PermissionMode) -> Result<()> {
        let request_id = self.next_request_id();
        self.send_outbound(&OutboundMessage::ControlRequest {
            request_id,
            request: OutboundControlRequest::SetPermissionMode { mode },
        })
        .await
    }

    /// Switch the model for the rest of the session
    ///
    /// # Errors
    /// Returns error if the message cannot be written
    pub async fn set_model(&self, model: Option<String>) -> Result<()> {
        let request_id = self.next_request_id();
        self.send_outbound(&OutboundMessage::ControlRequest {
            request_id,
            request: OutboundControlRequest::SetModel { model },
        })
        .await
    }

    /// Rewind tracked files to their state at a user message
    ///
    /// # Errors
    /// Returns error if the message cannot be written
    pub async fn rewind_files(&self, user_message_uuid: impl Into<String>) -> Result<()> {
        self.send_outbound(&OutboundMessage::RewindFiles {
            user_message_uuid: user_message_uuid.into(),
        })
        .await
    }

    /// Manually answer a pending permission request
    ///
    /// A no-op if the pipeline already resolved the check; the process sees
    /// at most one response per tool use.
    ///
    /// # Errors
    /// Returns error if the response cannot be written
    pub async fn grant_permission(
        &self,
        tool_use_id: ToolUseId,
        allow: bool,
        reason: Option<String>,
    ) -> Result<()> {
        let Some(response) = self.pipeline.resolve_manual(&tool_use_id, allow, reason) else {
            return Ok(());
        };
        self.send_outbound(&response).await
    }

    /// Session id captured from the first message that carried one
    #[must_use]
    pub fn session_id(&self) -> Option<SessionId> {
        self.session_id.lock().clone()
    }

    /// Stop the session: fire session-end hooks, close stdin, wait for the
    /// process to exit
    ///
    /// # Errors
    /// Returns error if teardown fails
    pub async fn stop(&mut self) -> Result<()> {
        if self.stopped {
            return Ok(());
        }
        self.stopped = true;

        self.pipeline.on_session_end("stop").await;
        log::debug!(
            "stopping session after {}s",
            (Utc::now() - self.started_at).num_seconds()
        );

        let mut transport = self.transport.lock().await;
        transport.close().await
    }
}

impl Drop for super::BridgeClient {
    fn drop(&mut self) {
        if !self.stopped {
            log::debug!("client dropped without stop(); transport drop will kill the process");
        }
    }
}
