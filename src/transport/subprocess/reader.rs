//! Background reader loop for subprocess transport
//!
//! Reads stdout line by line and decodes each line into a typed message on
//! a bounded queue. One malformed or version-skewed line is logged and
//! skipped, never fatal; only transport-level failures end the stream.

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, LinesCodec, LinesCodecError};

use crate::error::{BridgeError, Result};
use crate::message::parser::decode_line;
use crate::types::messages::Message;

use super::transport::SubprocessTransport;

impl SubprocessTransport {
    /// Spawn the background reader and return the inbound queue
    pub(super) fn read_messages_impl(&mut self) -> mpsc::Receiver<Result<Message>> {
        let (tx, rx) = mpsc::channel(self.channel_capacity);

        // Take ownership of stdout; the child handle stays shared so close()
        // can still wait on it
        let stdout = self.stdout.take();
        let process = self.process.clone();
        let session_id = self.session_id.clone();
        let max_buffer_size = self.max_buffer_size;

        let task = tokio::spawn(async move {
            let Some(stdout) = stdout else {
                let _ = tx
                    .send(Err(BridgeError::connection(
                        "Not connected - stdout not available",
                    )))
                    .await;
                return;
            };

            let codec = LinesCodec::new_with_max_length(max_buffer_size);
            let mut lines = FramedRead::new(stdout, codec);

            while let Some(next) = lines.next().await {
                match next {
                    Ok(line) => {
                        let line = line.trim();
                        if line.is_empty() {
                            continue;
                        }

                        match decode_line(line) {
                            Ok(message) => {
                                // First session id wins, never overwritten
                                if let Some(id) = message.session_id() {
                                    let mut guard = session_id.lock();
                                    if guard.is_none() {
                                        *guard = Some(id.clone());
                                    }
                                }
                                if tx.send(Ok(message)).await.is_err() {
                                    // Receiver dropped, stop reading
                                    return;
                                }
                            }
                            Err(e) => {
                                // Forward progress over completeness
                                log::warn!("skipping undecodable line: {e}");
                            }
                        }
                    }
                    Err(LinesCodecError::MaxLineLengthExceeded) => {
                        // The codec discards the oversized remainder itself
                        log::warn!(
                            "skipping line exceeding maximum buffer size of \
                             {max_buffer_size} bytes"
                        );
                    }
                    Err(LinesCodecError::Io(e)) => {
                        let _ = tx.send(Err(BridgeError::Io(e))).await;
                        break;
                    }
                }
            }

            // Check process exit code; the child stays in place for close()
            let mut process_guard = process.lock().await;
            if let Some(child) = process_guard.as_mut() {
                match child.wait().await {
                    Ok(status) => {
                        if !status.success()
                            && let Some(code) = status.code()
                        {
                            let _ = tx
                                .send(Err(BridgeError::process(
                                    "Agent process failed",
                                    code,
                                    Some("Check stderr output for details".to_string()),
                                )))
                                .await;
                        }
                    }
                    Err(e) => {
                        let _ = tx.send(Err(BridgeError::Io(e))).await;
                    }
                }
            }
        });

        self.reader_task = Some(task);

        rx
    }
}
