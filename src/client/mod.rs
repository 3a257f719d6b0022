//! Interactive bidirectional client
//!
//! [`BridgeClient`] is the turn-taking facade over the transport, the
//! control bridge, and the hook/permission pipeline. One client owns one
//! agent process for its whole life.

mod client_impl;
mod tasks;

use std::sync::Arc;
use std::sync::atomic::AtomicU64;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, mpsc};

use crate::error::Result;
use crate::hooks::HookPipeline;
use crate::transport::SubprocessTransport;
use crate::types::identifiers::SessionId;
use crate::types::messages::Message;

/// Client for bidirectional communication with an agent process
///
/// Created with [`BridgeClient::start`]; conversation messages arrive
/// through [`BridgeClient::next_message`] or
/// [`BridgeClient::response_stream`], already filtered of control traffic.
pub struct BridgeClient {
    /// Transport layer; writes from any flow serialize on this lock
    transport: Arc<Mutex<SubprocessTransport>>,
    /// Hook/permission pipeline shared with the dispatch task
    pipeline: Arc<HookPipeline>,
    /// Filtered inbound messages
    message_rx: mpsc::Receiver<Result<Message>>,
    /// Counter for outbound control request ids
    next_request_id: AtomicU64,
    /// Session id captured from the first message that carried one
    session_id: Arc<parking_lot::Mutex<Option<SessionId>>>,
    /// When the session started
    started_at: DateTime<Utc>,
    /// Guard so stop() only tears down once
    stopped: bool,
}
