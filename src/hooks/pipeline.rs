//! Hook/permission interception pipeline
//!
//! Sits between the transport and the session facade: resolves out-of-band
//! permission requests (hooks first, then the user callback or the mode
//! default), synthesizes post-tool-use and subagent events from assistant
//! content blocks, and fires the lifecycle hooks.
//!
//! Each pending permission check walks `Pending -> {Allowed, Denied}` and
//! its terminal state goes back to the process exactly once.

use std::collections::HashMap;

use parking_lot::Mutex;

use super::HookManager;
use crate::permissions::PermissionManager;
use crate::types::hooks::{HookContext, HookEvent, HookInput, HookOutput};
use crate::types::identifiers::{SessionId, ToolName, ToolUseId};
use crate::types::messages::{ContentBlock, ContentValue, OutboundMessage};
use crate::types::permissions::{PermissionMode, PermissionResult, ToolPermissionContext};

/// State of one permission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CheckState {
    Pending,
    Resolved,
}

/// The interception pipeline shared by the dispatch task and the facade
pub struct HookPipeline {
    hooks: HookManager,
    permissions: PermissionManager,
    mode: PermissionMode,
    subagent_tool: ToolName,
    cwd: Option<String>,
    session_id: Mutex<Option<SessionId>>,
    pending_checks: Mutex<HashMap<ToolUseId, CheckState>>,
}

impl HookPipeline {
    /// Create a pipeline
    #[must_use]
    pub fn new(
        hooks: HookManager,
        permissions: PermissionManager,
        mode: PermissionMode,
        subagent_tool: ToolName,
        cwd: Option<String>,
    ) -> Self {
        Self {
            hooks,
            permissions,
            mode,
            subagent_tool,
            cwd,
            session_id: Mutex::new(None),
            pending_checks: Mutex::new(HashMap::new()),
        }
    }

    /// Record the session id once the transport captures it
    pub fn set_session_id(&self, session_id: SessionId) {
        let mut guard = self.session_id.lock();
        if guard.is_none() {
            *guard = Some(session_id);
        }
    }

    /// Access the permission manager (for the in-band control path)
    #[must_use]
    pub fn permissions(&self) -> &PermissionManager {
        &self.permissions
    }

    /// Hook input stamped with the event and the session-wide fields
    fn base_input(&self, event: HookEvent) -> HookInput {
        let mut input = HookInput::for_event(event);
        input.session_id = self.session_id.lock().clone();
        input.cwd = self.cwd.clone();
        input.permission_mode = Some(self.mode.as_str().to_string());
        input
    }

    /// Fire an event's hooks, logging failures instead of propagating them
    async fn fire(&self, event: HookEvent, input: &HookInput) -> HookOutput {
        match self.hooks.invoke(event, input, &HookContext::default()).await {
            Ok(output) => output,
            Err(e) => {
                log::error!("{} hook failed: {e}", event.as_str());
                HookOutput::default()
            }
        }
    }

    /// Process an out-of-band permission request
    ///
    /// Returns the `permission_response` line to write, or `None` when the
    /// check was already resolved (the response must go out exactly once).
    pub async fn on_permission_request(
        &self,
        tool_use_id: &ToolUseId,
        tool_name: &ToolName,
        tool_input: &serde_json::Value,
    ) -> Option<OutboundMessage> {
        {
            let mut pending = self.pending_checks.lock();
            if pending.contains_key(tool_use_id) {
                log::warn!(
                    "duplicate permission request for tool use {}; ignoring",
                    tool_use_id.as_str()
                );
                return None;
            }
            pending.insert(tool_use_id.clone(), CheckState::Pending);
        }

        // Bypass mode answers without consulting hooks or the callback
        if self.mode == PermissionMode::BypassPermissions {
            return self.finish(tool_use_id, true, None);
        }

        let mut input = self.base_input(HookEvent::PreToolUse);
        input.tool_name = Some(tool_name.clone());
        input.tool_input = Some(tool_input.clone());
        input.tool_use_id = Some(tool_use_id.clone());

        let output = self.fire(HookEvent::PreToolUse, &input).await;
        if output.is_block() {
            let reason = output
                .reason
                .unwrap_or_else(|| "Denied by pre-tool-use hook".to_string());
            return self.finish(tool_use_id, false, Some(reason));
        }

        // Observational only; outcome ignored
        let mut observed = input.clone();
        observed.hook_event_name = Some(HookEvent::PermissionObserved.as_str().to_string());
        self.fire(HookEvent::PermissionObserved, &observed).await;

        let had_callback = self.permissions.has_callback();
        let result = match self
            .permissions
            .can_use_tool(
                tool_name.clone(),
                tool_input.clone(),
                ToolPermissionContext::default(),
            )
            .await
        {
            Ok(result) => result,
            Err(e) => {
                log::error!("permission callback failed: {e}");
                PermissionResult::deny(format!("Permission callback failed: {e}"))
            }
        };

        // With no callback the configured mode governs the default
        let result = if !had_callback && result.is_allow() && self.mode == PermissionMode::Plan {
            PermissionResult::deny("Plan mode forbids tool execution")
        } else {
            result
        };

        match result {
            PermissionResult::Allow(_) => self.finish(tool_use_id, true, None),
            PermissionResult::Deny(deny) => {
                self.finish(tool_use_id, false, Some(deny.message))
            }
        }
    }

    /// Manually resolve a pending check (the `grant_permission` path)
    ///
    /// Returns `None` when the check was already resolved, guaranteeing the
    /// process never sees a second response for the same tool use.
    pub fn resolve_manual(
        &self,
        tool_use_id: &ToolUseId,
        allow: bool,
        reason: Option<String>,
    ) -> Option<OutboundMessage> {
        self.finish(tool_use_id, allow, reason)
    }

    /// Move a check to its terminal state and build the response line
    ///
    /// The state transition and the decision to emit are one critical
    /// section: whichever path gets here first wins, every later attempt
    /// gets `None`.
    fn finish(
        &self,
        tool_use_id: &ToolUseId,
        allow: bool,
        reason: Option<String>,
    ) -> Option<OutboundMessage> {
        {
            let mut pending = self.pending_checks.lock();
            if pending.get(tool_use_id) == Some(&CheckState::Resolved) {
                log::warn!(
                    "permission for tool use {} already resolved; ignoring",
                    tool_use_id.as_str()
                );
                return None;
            }
            pending.insert(tool_use_id.clone(), CheckState::Resolved);
        }
        Some(OutboundMessage::PermissionResponse {
            tool_use_id: tool_use_id.clone(),
            allow,
            reason,
        })
    }

    /// Scan an assistant message's content blocks and fire post-tool-use,
    /// post-tool-use-failure, and subagent hooks
    ///
    /// A tool result pairs with the tool use that appeared earlier in the
    /// same message. Unmatched results are logged and skipped; so is
    /// subagent inference when a message holds more than one use of the
    /// subagent tool, since pairing would be a guess.
    pub async fn on_assistant_message(&self, content: &[ContentBlock]) {
        let subagent_uses = content
            .iter()
            .filter(|block| {
                matches!(block, ContentBlock::ToolUse { name, .. } if *name == self.subagent_tool)
            })
            .count();
        if subagent_uses > 1 {
            log::warn!(
                "{subagent_uses} concurrent '{}' uses in one message; skipping subagent hooks",
                self.subagent_tool
            );
        }
        let infer_subagent = subagent_uses == 1;

        let mut seen_uses: HashMap<ToolUseId, (ToolName, serde_json::Value)> = HashMap::new();

        for block in content {
            match block {
                ContentBlock::ToolUse { id, name, input } => {
                    seen_uses.insert(id.clone(), (name.clone(), input.clone()));
                    if infer_subagent && *name == self.subagent_tool {
                        let mut hook_input = self.base_input(HookEvent::SubagentStart);
                        hook_input.tool_name = Some(name.clone());
                        hook_input.tool_input = Some(input.clone());
                        hook_input.tool_use_id = Some(id.clone());
                        self.fire(HookEvent::SubagentStart, &hook_input).await;
                    }
                }
                ContentBlock::ToolResult {
                    tool_use_id,
                    content,
                    is_error,
                } => {
                    let Some((name, original_input)) = seen_uses.get(tool_use_id) else {
                        log::warn!(
                            "tool result {} has no matching tool use in this message; \
                             skipping post-tool-use hooks",
                            tool_use_id.as_str()
                        );
                        continue;
                    };

                    let failed = is_error.unwrap_or(false);
                    let event = if failed {
                        HookEvent::PostToolUseFailure
                    } else {
                        HookEvent::PostToolUse
                    };
                    let mut hook_input = self.base_input(event);
                    hook_input.tool_name = Some(name.clone());
                    hook_input.tool_input = Some(original_input.clone());
                    hook_input.tool_use_id = Some(tool_use_id.clone());
                    hook_input.tool_response = content
                        .as_ref()
                        .and_then(|c| serde_json::to_value(c).ok());
                    if failed {
                        hook_input.error = content.as_ref().and_then(|c| match c {
                            ContentValue::String(s) => Some(s.clone()),
                            ContentValue::Blocks(_) => None,
                        });
                    }
                    self.fire(event, &hook_input).await;

                    if infer_subagent && *name == self.subagent_tool {
                        let mut stop_input = self.base_input(HookEvent::SubagentStop);
                        stop_input.tool_name = Some(name.clone());
                        stop_input.tool_use_id = Some(tool_use_id.clone());
                        self.fire(HookEvent::SubagentStop, &stop_input).await;
                    }
                }
                _ => {}
            }
        }
    }

    /// Fire stop hooks for a terminal result
    pub async fn on_result(&self, subtype: &str, is_error: bool) {
        let mut input = self.base_input(HookEvent::Stop);
        if is_error {
            input.error = Some(subtype.to_string());
        }
        self.fire(HookEvent::Stop, &input).await;
    }

    /// Fire user-prompt-submit hooks before a prompt is written
    pub async fn on_user_prompt(&self, prompt: &str) {
        let mut input = self.base_input(HookEvent::UserPromptSubmit);
        input.prompt = Some(prompt.to_string());
        self.fire(HookEvent::UserPromptSubmit, &input).await;
    }

    /// Fire session-start hooks
    pub async fn on_session_start(&self, source: &str) {
        let mut input = self.base_input(HookEvent::SessionStart);
        input.source = Some(source.to_string());
        self.fire(HookEvent::SessionStart, &input).await;
    }

    /// Fire session-end hooks
    pub async fn on_session_end(&self, reason: &str) {
        let mut input = self.base_input(HookEvent::SessionEnd);
        input.session_end_reason = Some(reason.to_string());
        self.fire(HookEvent::SessionEnd, &input).await;
    }

    /// Run the callbacks for an in-band `hook_callback` control request
    ///
    /// The free-form input is lifted into a typed [`HookInput`] keyed on its
    /// `hook_event_name`; hooks reached this way are observational and their
    /// merged output goes back in the success response.
    pub async fn on_hook_callback(
        &self,
        callback_id: &str,
        input: serde_json::Value,
        tool_use_id: Option<ToolUseId>,
    ) -> HookOutput {
        let event_name = input
            .get("hook_event_name")
            .and_then(|n| n.as_str())
            .map(str::to_string);
        let Some(event) = event_name.as_deref().and_then(HookEvent::from_name) else {
            log::warn!(
                "hook callback {callback_id} has unknown event {event_name:?}; nothing fired"
            );
            return HookOutput::default();
        };

        let mut hook_input: HookInput = serde_json::from_value(input).unwrap_or_default();
        hook_input.hook_event_name = Some(event.as_str().to_string());
        if hook_input.session_id.is_none() {
            hook_input.session_id = self.session_id.lock().clone();
        }
        if hook_input.cwd.is_none() {
            hook_input.cwd = self.cwd.clone();
        }
        if hook_input.permission_mode.is_none() {
            hook_input.permission_mode = Some(self.mode.as_str().to_string());
        }
        if hook_input.tool_use_id.is_none() {
            hook_input.tool_use_id = tool_use_id;
        }

        self.fire(event, &hook_input).await
    }
}

impl std::fmt::Debug for HookPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookPipeline")
            .field("hooks", &self.hooks)
            .field("permissions", &self.permissions)
            .field("mode", &self.mode)
            .field("subagent_tool", &self.subagent_tool)
            .field("pending_checks", &self.pending_checks.lock().len())
            .finish()
    }
}
