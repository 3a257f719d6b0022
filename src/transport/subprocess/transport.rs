//! Subprocess transport implementation over the agent CLI

use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin, ChildStdout};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::Transport;
use crate::error::{BridgeError, Result};
use crate::types::identifiers::SessionId;
use crate::types::messages::{Message, OutboundMessage};
use crate::types::options::BridgeOptions;

use super::config::{DEFAULT_CHANNEL_CAPACITY, DEFAULT_MAX_BUFFER_SIZE, PromptInput};

/// Subprocess transport over the agent CLI
pub struct SubprocessTransport {
    pub(super) prompt: PromptInput,
    pub(super) options: BridgeOptions,
    pub(super) cli_path: PathBuf,
    pub(super) cwd: Option<PathBuf>,
    pub(super) process: Arc<tokio::sync::Mutex<Option<Child>>>,
    pub(super) stdin: Option<ChildStdin>,
    pub(super) stdout: Option<ChildStdout>,
    pub(super) ready: Arc<AtomicBool>,
    pub(super) max_buffer_size: usize,
    pub(super) channel_capacity: usize,
    pub(super) session_id: Arc<parking_lot::Mutex<Option<SessionId>>>,
    pub(super) reader_task: Option<JoinHandle<()>>,
    pub(super) stderr_task: Option<JoinHandle<()>>,
}

impl SubprocessTransport {
    /// Create a new subprocess transport
    ///
    /// # Arguments
    /// * `prompt` - The prompt input (string or stream)
    /// * `options` - Configuration options
    /// * `cli_path` - Optional path to the CLI (will search if None)
    ///
    /// # Errors
    /// Returns error if the CLI cannot be found
    pub fn new(
        prompt: PromptInput,
        options: BridgeOptions,
        cli_path: Option<PathBuf>,
    ) -> Result<Self> {
        let cli_path = if let Some(path) = cli_path {
            path
        } else {
            Self::find_cli()?
        };

        let cwd = options.cwd.clone();
        let max_buffer_size = options.max_buffer_size.unwrap_or(DEFAULT_MAX_BUFFER_SIZE);
        let channel_capacity = options
            .channel_capacity
            .unwrap_or(DEFAULT_CHANNEL_CAPACITY);

        Ok(Self {
            prompt,
            options,
            cli_path,
            cwd,
            process: Arc::new(tokio::sync::Mutex::new(None)),
            stdin: None,
            stdout: None,
            ready: Arc::new(AtomicBool::new(false)),
            max_buffer_size,
            channel_capacity,
            session_id: Arc::new(parking_lot::Mutex::new(None)),
            reader_task: None,
            stderr_task: None,
        })
    }

    /// Find the agent CLI binary
    ///
    /// # Errors
    /// Returns error if the CLI cannot be found in PATH or common locations
    pub fn find_cli() -> Result<PathBuf> {
        if let Ok(path) = which::which("claude") {
            return Ok(path);
        }

        // Manual search in common locations
        let home = env::var("HOME").unwrap_or_else(|_| String::from("/root"));
        let locations = vec![
            PathBuf::from(home.clone()).join(".npm-global/bin/claude"),
            PathBuf::from("/usr/local/bin/claude"),
            PathBuf::from(home.clone()).join(".local/bin/claude"),
            PathBuf::from(home.clone()).join("node_modules/.bin/claude"),
            PathBuf::from(home).join(".yarn/bin/claude"),
        ];

        for path in locations {
            if path.exists() && path.is_file() {
                return Ok(path);
            }
        }

        Err(BridgeError::cli_not_found())
    }
}

impl Transport for SubprocessTransport {
    async fn connect(&mut self) -> Result<()> {
        self.connect_impl().await
    }

    async fn send(&mut self, message: &OutboundMessage) -> Result<()> {
        if !self.is_ready() {
            return Err(BridgeError::connection(
                "Transport is not ready for writing",
            ));
        }

        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| BridgeError::connection("stdin not available"))?;

        let mut line = serde_json::to_string(message)?;
        line.push('\n');

        stdin
            .write_all(line.as_bytes())
            .await
            .map_err(|e| BridgeError::connection(format!("Failed to write to stdin: {e}")))?;

        stdin
            .flush()
            .await
            .map_err(|e| BridgeError::connection(format!("Failed to flush stdin: {e}")))?;

        Ok(())
    }

    async fn end_input(&mut self) -> Result<()> {
        if let Some(mut stdin) = self.stdin.take() {
            stdin
                .shutdown()
                .await
                .map_err(|e| BridgeError::connection(format!("Failed to close stdin: {e}")))?;
        }
        Ok(())
    }

    fn read_messages(&mut self) -> mpsc::Receiver<Result<Message>> {
        self.read_messages_impl()
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn session_id(&self) -> Option<SessionId> {
        self.session_id.lock().clone()
    }

    async fn close(&mut self) -> Result<()> {
        self.close_impl().await
    }
}

impl Drop for SubprocessTransport {
    fn drop(&mut self) {
        self.drop_impl();
    }
}
