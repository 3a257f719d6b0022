//! Control bridge answering inbound control requests
//!
//! Every `control_request` pulled off the transport gets exactly one
//! `control_response` with the same `request_id`. Handling one request never
//! waits on another; the bridge is fire-and-forget, not a promise table.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;

use super::messages::{ControlRequestInner, ControlResponsePayload};
use crate::hooks::HookPipeline;
use crate::mcp::SdkMcpServer;
use crate::types::identifiers::RequestId;
use crate::types::messages::OutboundMessage;
use crate::types::permissions::{PermissionResult, ToolPermissionContext};

/// Dispatches inbound control requests to the tool servers, the permission
/// callback, and the hook pipeline
pub struct ControlBridge {
    servers: HashMap<String, SdkMcpServer>,
    pipeline: Arc<HookPipeline>,
}

impl ControlBridge {
    /// Create a bridge over the registered in-process servers
    #[must_use]
    pub fn new(servers: HashMap<String, SdkMcpServer>, pipeline: Arc<HookPipeline>) -> Self {
        Self { servers, pipeline }
    }

    /// Names of the registered in-process servers
    #[must_use]
    pub fn server_names(&self) -> Vec<String> {
        self.servers.keys().cloned().collect()
    }

    /// Answer one control request
    ///
    /// Always produces a response line; unrecognized subtypes get an error
    /// response rather than silence.
    pub async fn handle(
        &self,
        request_id: RequestId,
        request: ControlRequestInner,
    ) -> OutboundMessage {
        log::debug!(
            "control request {} ({})",
            request_id.as_str(),
            request.subtype()
        );

        let payload = match request {
            // This side's servers were announced at startup; nothing to add
            ControlRequestInner::Initialize { .. } => {
                ControlResponsePayload::success(request_id, None)
            }

            ControlRequestInner::McpMessage {
                server_name,
                message,
            } => match self.servers.get(&server_name) {
                None => ControlResponsePayload::error(
                    request_id,
                    format!("Unknown sdk MCP server: {server_name}"),
                ),
                Some(server) => {
                    // Notifications produce no JSON-RPC reply; the control
                    // response still acknowledges delivery
                    let reply = server.handle(&message).await.unwrap_or_else(|| json!({}));
                    ControlResponsePayload::success(
                        request_id,
                        Some(json!({ "mcp_response": reply })),
                    )
                }
            },

            ControlRequestInner::CanUseTool {
                tool_name,
                input,
                permission_suggestions,
                blocked_path,
            } => {
                let context = ToolPermissionContext {
                    suggestions: permission_suggestions.unwrap_or_default(),
                    blocked_path,
                };
                match self
                    .pipeline
                    .permissions()
                    .can_use_tool(tool_name, input.clone(), context)
                    .await
                {
                    Ok(PermissionResult::Allow(allow)) => {
                        let updated = allow.updated_input.unwrap_or(input);
                        let mut body = json!({
                            "behavior": "allow",
                            "updatedInput": updated,
                        });
                        if let Some(updates) = allow.updated_permissions {
                            body["updatedPermissions"] =
                                serde_json::to_value(updates).unwrap_or_default();
                        }
                        ControlResponsePayload::success(request_id, Some(body))
                    }
                    Ok(PermissionResult::Deny(deny)) => ControlResponsePayload::success(
                        request_id,
                        Some(json!({
                            "behavior": "deny",
                            "message": deny.message,
                            "interrupt": deny.interrupt,
                        })),
                    ),
                    Err(e) => ControlResponsePayload::error(
                        request_id,
                        format!("Permission callback failed: {e}"),
                    ),
                }
            }

            ControlRequestInner::HookCallback {
                callback_id,
                input,
                tool_use_id,
            } => {
                // Observational; success regardless of what the hooks decide
                let output = self
                    .pipeline
                    .on_hook_callback(&callback_id, input, tool_use_id)
                    .await;
                let body = serde_json::to_value(&output).unwrap_or_else(|_| json!({}));
                ControlResponsePayload::success(request_id, Some(body))
            }

            // Inbound-only notification plumbing; the action itself is a
            // separate outbound message the facade sends proactively
            ControlRequestInner::Interrupt
            | ControlRequestInner::SetPermissionMode { .. }
            | ControlRequestInner::RewindFiles { .. } => {
                ControlResponsePayload::success(request_id, None)
            }

            ControlRequestInner::Other { subtype, .. } => {
                log::warn!("unhandled control request subtype: {subtype}");
                ControlResponsePayload::error(
                    request_id,
                    format!("Unsupported control request subtype: {subtype}"),
                )
            }
        };

        OutboundMessage::ControlResponse { response: payload }
    }
}

impl std::fmt::Debug for ControlBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlBridge")
            .field("servers", &self.servers.keys().collect::<Vec<_>>())
            .finish()
    }
}
