//! Background dispatch task for [`BridgeClient`](super::BridgeClient)
//!
//! One task per client pulls decoded messages off the transport queue,
//! answers control requests through the bridge, runs the hook/permission
//! pipeline, and forwards everything else to the facade in arrival order.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};

use crate::control::ControlBridge;
use crate::error::Result;
use crate::hooks::HookPipeline;
use crate::transport::{SubprocessTransport, Transport};
use crate::types::identifiers::SessionId;
use crate::types::messages::Message;

impl super::BridgeClient {
    /// Dispatch task: reads from the transport queue and processes messages
    pub(super) async fn dispatch_task(
        transport: Arc<Mutex<SubprocessTransport>>,
        pipeline: Arc<HookPipeline>,
        bridge: ControlBridge,
        mut inbound: mpsc::Receiver<Result<Message>>,
        message_tx: mpsc::Sender<Result<Message>>,
        session_id: Arc<parking_lot::Mutex<Option<SessionId>>>,
    ) {
        while let Some(item) = inbound.recv().await {
            let message = match item {
                Ok(message) => message,
                Err(e) => {
                    // Transport-level failure; surface it and keep draining
                    // in case the queue still holds buffered messages
                    if message_tx.send(Err(e)).await.is_err() {
                        return;
                    }
                    continue;
                }
            };

            if let Some(id) = message.session_id() {
                {
                    let mut guard = session_id.lock();
                    if guard.is_none() {
                        *guard = Some(id.clone());
                    }
                }
                pipeline.set_session_id(id.clone());
            }

            match message {
                // Answered internally, never surfaced to the caller
                Message::ControlRequest {
                    request_id,
                    request,
                } => {
                    let response = bridge.handle(request_id, request).await;
                    let mut transport_guard = transport.lock().await;
                    if let Err(e) = transport_guard.send(&response).await {
                        log::error!("failed to send control response: {e}");
                    }
                }
                // Opaque acknowledgment of a request this side sent
                Message::ControlResponse { response } => {
                    log::debug!("control response acknowledged: {response}");
                }
                other => {
                    match &other {
                        Message::Assistant { message, .. } => {
                            pipeline.on_assistant_message(&message.content).await;
                        }
                        Message::Result {
                            subtype, is_error, ..
                        } => {
                            pipeline.on_result(subtype, *is_error).await;
                        }
                        Message::PermissionRequest {
                            tool_use_id,
                            tool_name,
                            tool_input,
                            ..
                        } => {
                            if let Some(response) = pipeline
                                .on_permission_request(tool_use_id, tool_name, tool_input)
                                .await
                            {
                                let mut transport_guard = transport.lock().await;
                                if let Err(e) = transport_guard.send(&response).await {
                                    log::error!("failed to send permission response: {e}");
                                }
                            }
                        }
                        _ => {}
                    }

                    if message_tx.send(Ok(other)).await.is_err() {
                        // Receiver dropped, stop dispatching
                        return;
                    }
                }
            }
        }
    }
}
