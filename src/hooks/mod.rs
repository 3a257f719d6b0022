//! Hook system for intercepting agent events
//!
//! Users register hook callbacks keyed by event, optionally scoped to tool
//! names by a matcher pattern. Evaluation is strictly sequential: for a
//! blocking event the first Block decision wins and later hooks never run.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Result;
use crate::types::hooks::{
    HookCallback, HookContext, HookEvent, HookInput, HookMatcher, HookOutput,
};

pub mod pipeline;

pub use pipeline::HookPipeline;

/// Hook manager for registering and invoking hooks
#[derive(Default)]
pub struct HookManager {
    /// Registered hook matchers, keyed by event
    matchers: HashMap<HookEvent, Vec<HookMatcher>>,
}

impl HookManager {
    /// Create a new hook manager
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a manager from a full hook configuration
    #[must_use]
    pub fn from_config(config: HashMap<HookEvent, Vec<HookMatcher>>) -> Self {
        Self { matchers: config }
    }

    /// Register a hook matcher for an event
    pub fn register(&mut self, event: HookEvent, matcher: HookMatcher) {
        self.matchers.entry(event).or_default().push(matcher);
    }

    /// Whether any hooks are registered for an event
    #[must_use]
    pub fn has_hooks(&self, event: HookEvent) -> bool {
        self.matchers.get(&event).is_some_and(|m| !m.is_empty())
    }

    /// Invoke hooks registered for an event, in registration order
    ///
    /// Outputs are merged; a Block decision short-circuits the remaining
    /// hooks and is returned immediately.
    ///
    /// # Errors
    /// Returns error if a hook callback fails
    pub async fn invoke(
        &self,
        event: HookEvent,
        input: &HookInput,
        context: &HookContext,
    ) -> Result<HookOutput> {
        let mut output = HookOutput::default();

        let Some(matchers) = self.matchers.get(&event) else {
            return Ok(output);
        };

        let tool_name = input.tool_name.as_ref().map(|t| t.as_str().to_string());
        for matcher in matchers {
            if !Self::matches(matcher.matcher.as_ref(), tool_name.as_ref()) {
                continue;
            }
            for hook in &matcher.hooks {
                let result = hook(input.clone(), context.clone()).await?;

                if result.decision.is_some() {
                    output.decision = result.decision;
                }
                if result.reason.is_some() {
                    output.reason = result.reason;
                }
                if result.system_message.is_some() {
                    output.system_message = result.system_message;
                }
                if result.hook_specific_output.is_some() {
                    output.hook_specific_output = result.hook_specific_output;
                }

                if output.is_block() {
                    return Ok(output);
                }
            }
        }

        Ok(output)
    }

    /// Check if a matcher pattern matches a tool name
    ///
    /// Patterns are a tool name, pipe-separated alternatives, or `*`.
    /// A `None` matcher matches everything.
    #[must_use]
    pub fn matches(matcher: Option<&String>, tool_name: Option<&String>) -> bool {
        match (matcher, tool_name) {
            (None, _) => true,
            (Some(pattern), Some(name)) => {
                if pattern == "*" {
                    return true;
                }
                pattern == name || pattern.split('|').any(|p| p == name)
            }
            (Some(_), None) => false,
        }
    }

    /// Create a hook callback from a closure
    pub fn callback<F, Fut>(f: F) -> HookCallback
    where
        F: Fn(HookInput, HookContext) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<HookOutput>> + Send + 'static,
    {
        Arc::new(move |input, context| Box::pin(f(input, context)))
    }
}

impl std::fmt::Debug for HookManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<&str, usize> = self
            .matchers
            .iter()
            .map(|(event, m)| (event.as_str(), m.len()))
            .collect();
        f.debug_struct("HookManager").field("matchers", &counts).finish()
    }
}

/// Builder for creating hook matchers
pub struct HookMatcherBuilder {
    matcher: Option<String>,
    hooks: Vec<HookCallback>,
}

impl HookMatcherBuilder {
    /// Create a new hook matcher builder
    ///
    /// # Arguments
    /// * `pattern` - Matcher pattern (None for all, or tool name/pattern)
    pub fn new(pattern: Option<impl Into<String>>) -> Self {
        Self {
            matcher: pattern.map(Into::into),
            hooks: Vec::new(),
        }
    }

    /// Add a hook callback
    #[must_use]
    pub fn add_hook(mut self, hook: HookCallback) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Build the hook matcher
    #[must_use]
    pub fn build(self) -> HookMatcher {
        HookMatcher {
            matcher: self.matcher,
            hooks: self.hooks,
        }
    }
}
