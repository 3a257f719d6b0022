//! Simple one-shot query function

use async_stream::stream;
use futures::Stream;

use crate::error::Result;
use crate::transport::{PromptInput, SubprocessTransport, Transport};
use crate::types::messages::Message;
use crate::types::options::BridgeOptions;

/// Run a one-shot query against the agent process
///
/// Spawns the process in string-prompt mode and streams its messages until
/// the terminal result, then closes the process. For stateful, bidirectional
/// conversations use [`BridgeClient`](crate::BridgeClient) instead.
///
/// # Errors
/// Returns error if the CLI cannot be found or fails to start
pub async fn query(
    prompt: impl Into<String>,
    options: Option<BridgeOptions>,
) -> Result<impl Stream<Item = Result<Message>>> {
    let options = options.unwrap_or_default();
    let mut transport =
        SubprocessTransport::new(PromptInput::String(prompt.into()), options, None)?;
    transport.connect().await?;
    let mut inbound = transport.read_messages();

    Ok(stream! {
        while let Some(item) = inbound.recv().await {
            let terminal = matches!(&item, Ok(message) if message.is_terminal());
            yield item;
            if terminal {
                break;
            }
        }
        if let Err(e) = transport.close().await {
            log::warn!("error closing transport after query: {e}");
        }
    })
}
