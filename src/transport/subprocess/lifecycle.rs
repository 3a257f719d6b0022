//! Lifecycle management for subprocess transport (connect, close)

use std::collections::HashMap;
use std::env;
use std::process::Stdio;
use std::sync::atomic::Ordering;

use crate::VERSION;
use crate::error::{BridgeError, Result};

use super::command::CommandBuilder;
use super::config::{DANGEROUS_ENV_VARS, PromptInput};
use super::transport::SubprocessTransport;

impl SubprocessTransport {
    /// Connect to the subprocess transport
    ///
    /// Spawns the agent CLI process and sets up stdio pipes.
    ///
    /// # Errors
    /// Returns error if process spawning fails or stdio handles cannot be
    /// obtained
    pub(super) async fn connect_impl(&mut self) -> Result<()> {
        if self.process.lock().await.is_some() {
            return Ok(());
        }

        let builder = CommandBuilder::new(&self.cli_path, &self.prompt, &self.options);
        let mut cmd = builder.build();

        // Set up environment - filter dangerous variables
        let mut process_env = env::vars().collect::<HashMap<_, _>>();

        // Only add user-provided env vars that are not in the dangerous list
        for (key, value) in &self.options.env {
            if !DANGEROUS_ENV_VARS.contains(&key.as_str()) {
                process_env.insert(key.clone(), value.clone());
            }
        }

        process_env.insert(
            "CLAUDE_CODE_ENTRYPOINT".to_string(),
            "bridge-rust".to_string(),
        );
        process_env.insert("CLAUDE_BRIDGE_VERSION".to_string(), VERSION.to_string());

        if let Some(ref cwd) = self.cwd {
            process_env.insert("PWD".to_string(), cwd.to_string_lossy().to_string());
            cmd.current_dir(cwd);
        }

        cmd.envs(process_env);

        // Pipe stderr instead of inheriting so the child cannot manipulate
        // the parent terminal state
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| {
            if let Some(ref cwd) = self.cwd
                && !cwd.exists()
            {
                return BridgeError::connection(format!(
                    "Working directory does not exist: {}",
                    cwd.display()
                ));
            }
            BridgeError::connection(format!("Failed to start agent process: {e}"))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| BridgeError::connection("Failed to get stdin handle"))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| BridgeError::connection("Failed to get stdout handle"))?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| BridgeError::connection("Failed to get stderr handle"))?;

        // Drain stderr to prevent the child blocking on a full pipe; forward
        // to the parent's stderr for visibility
        let stderr_task = tokio::spawn(async move {
            use tokio::io::AsyncReadExt;
            let mut stderr = stderr;
            let mut buffer = vec![0u8; 4096];

            loop {
                match stderr.read(&mut buffer).await {
                    Ok(0) | Err(_) => break, // EOF
                    Ok(n) => {
                        let _ = std::io::Write::write_all(&mut std::io::stderr(), &buffer[..n]);
                    }
                }
            }
        });

        self.stdin = Some(stdin);
        self.stdout = Some(stdout);
        *self.process.lock().await = Some(child);
        self.stderr_task = Some(stderr_task);
        self.ready.store(true, Ordering::SeqCst);

        // For string mode, close stdin immediately
        if matches!(self.prompt, PromptInput::String(_))
            && let Some(mut stdin) = self.stdin.take()
        {
            use tokio::io::AsyncWriteExt;
            let _ = stdin.shutdown().await;
        }

        Ok(())
    }

    /// Close the transport and clean up resources
    ///
    /// Closes stdin, stops the reader, waits for the process with a grace
    /// timeout, then kills it if needed. No reader activity continues after
    /// this returns.
    ///
    /// # Errors
    /// Returns error if cleanup fails
    pub(super) async fn close_impl(&mut self) -> Result<()> {
        self.ready.store(false, Ordering::SeqCst);

        // Close stdin to signal the process to exit gracefully
        if let Some(mut stdin) = self.stdin.take() {
            use tokio::io::AsyncWriteExt;
            let _ = stdin.shutdown().await;
        }

        // Stop the reader before tearing the process down
        if let Some(task) = self.reader_task.take() {
            task.abort();
            let _ = task.await;
        }
        if let Some(task) = self.stderr_task.take() {
            task.abort();
        }

        self.stdout = None;

        if let Some(mut child) = self.process.lock().await.take() {
            let timeout_duration = std::time::Duration::from_secs(5);

            match tokio::time::timeout(timeout_duration, child.wait()).await {
                Ok(Ok(_status)) => {
                    // Process exited gracefully
                }
                Ok(Err(e)) => {
                    return Err(BridgeError::Io(e));
                }
                Err(_) => {
                    // Timeout - kill the process
                    let _ = child.kill().await;
                    let _ = child.wait().await;
                }
            }
        }

        Ok(())
    }

    /// Handle Drop cleanup
    pub(super) fn drop_impl(&mut self) {
        // Close stdin if still open to signal graceful shutdown
        if let Some(stdin) = self.stdin.take() {
            drop(stdin);
        }

        if let Some(task) = self.reader_task.take() {
            task.abort();
        }

        if let Some(task) = self.stderr_task.take() {
            task.abort();
        }

        if let Ok(mut guard) = self.process.try_lock()
            && let Some(child) = guard.as_mut()
        {
            let _ = child.start_kill();
        }
    }
}
