//! Permission system for tool access control
//!
//! Evaluates whether a tool invocation may proceed: static allow/deny lists
//! first, then the user-supplied callback. With no callback registered the
//! manager answers allow; mode-dependent defaults for the out-of-band
//! permission path live in the hook pipeline.

use std::sync::Arc;

use crate::error::Result;
use crate::types::identifiers::ToolName;
use crate::types::permissions::{
    CanUseToolCallback, PermissionResult, PermissionResultDeny, ToolPermissionContext,
};

/// Permission manager holding the callback and static tool lists
#[derive(Default)]
pub struct PermissionManager {
    callback: Option<CanUseToolCallback>,
    allowed_tools: Option<Vec<ToolName>>,
    disallowed_tools: Vec<ToolName>,
}

impl PermissionManager {
    /// Create a new permission manager
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the permission callback
    pub fn set_callback(&mut self, callback: CanUseToolCallback) {
        self.callback = Some(callback);
    }

    /// Set the allowed tools list; `None` disables the allowlist check
    pub fn set_allowed_tools(&mut self, tools: Option<Vec<ToolName>>) {
        self.allowed_tools = tools.filter(|t| !t.is_empty());
    }

    /// Set the disallowed tools list
    pub fn set_disallowed_tools(&mut self, tools: Vec<ToolName>) {
        self.disallowed_tools = tools;
    }

    /// Whether a user callback is registered
    #[must_use]
    pub fn has_callback(&self) -> bool {
        self.callback.is_some()
    }

    /// Decide whether a tool may be used
    ///
    /// # Errors
    /// Returns an error if the user callback fails
    pub async fn can_use_tool(
        &self,
        tool_name: ToolName,
        tool_input: serde_json::Value,
        context: ToolPermissionContext,
    ) -> Result<PermissionResult> {
        if self.disallowed_tools.contains(&tool_name) {
            return Ok(PermissionResult::Deny(PermissionResultDeny {
                message: format!("Tool '{tool_name}' is disallowed"),
                interrupt: false,
            }));
        }

        if let Some(ref allowed) = self.allowed_tools
            && !allowed.contains(&tool_name)
        {
            return Ok(PermissionResult::Deny(PermissionResultDeny {
                message: format!("Tool '{tool_name}' is not in the allowed list"),
                interrupt: false,
            }));
        }

        match self.callback {
            Some(ref callback) => callback(tool_name, tool_input, context).await,
            None => Ok(PermissionResult::allow()),
        }
    }

    /// Create a permission callback from a closure
    pub fn callback<F, Fut>(f: F) -> CanUseToolCallback
    where
        F: Fn(ToolName, serde_json::Value, ToolPermissionContext) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<PermissionResult>> + Send + 'static,
    {
        Arc::new(move |tool_name, tool_input, context| {
            Box::pin(f(tool_name, tool_input, context))
        })
    }
}

impl std::fmt::Debug for PermissionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionManager")
            .field("callback", &self.callback.as_ref().map(|_| "<callback>"))
            .field("allowed_tools", &self.allowed_tools)
            .field("disallowed_tools", &self.disallowed_tools)
            .finish()
    }
}
