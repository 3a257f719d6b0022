//! Transport layer for communicating with the agent process
//!
//! The transport owns the subprocess and its pipes: it writes one JSON line
//! per outbound message and runs a background loop decoding stdout lines
//! into typed messages on a bounded queue.

pub mod subprocess;

use tokio::sync::mpsc;

use crate::error::Result;
use crate::types::identifiers::SessionId;
use crate::types::messages::{Message, OutboundMessage};

/// Transport trait for driving an agent process
pub trait Transport: Send + Sync {
    /// Spawn the process and attach its pipes
    ///
    /// # Errors
    /// Returns error if the process cannot be started
    fn connect(&mut self) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Serialize a message to one newline-terminated JSON line and write it,
    /// flushing immediately
    ///
    /// # Errors
    /// Returns a connection error on a write failure (closed pipe, dead
    /// process) or when the transport is not ready
    fn send(
        &mut self,
        message: &OutboundMessage,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// End the input stream (close stdin)
    ///
    /// # Errors
    /// Returns error if closing fails
    fn end_input(&mut self) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Start the background reader and take the inbound message queue
    ///
    /// Messages arrive in the exact order the process emitted them. Lines
    /// that fail to decode are logged and skipped; only transport-level
    /// failures surface as errors, and they end the stream.
    fn read_messages(&mut self) -> mpsc::Receiver<Result<Message>>;

    /// Check if transport is ready for communication
    fn is_ready(&self) -> bool;

    /// Session id captured from the first message that carried one
    fn session_id(&self) -> Option<SessionId>;

    /// Close the transport: shut stdin, wait for process exit, release
    ///
    /// # Errors
    /// Returns error if cleanup fails
    fn close(&mut self) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub use subprocess::{PromptInput, SubprocessTransport};
