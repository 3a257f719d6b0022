//! Configuration constants and types for subprocess transport

/// Default maximum length of one wire line (1MB)
pub const DEFAULT_MAX_BUFFER_SIZE: usize = 1024 * 1024;

/// Default capacity of the inbound message queue
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Dangerous environment variables that should not be passed to subprocess
///
/// These variables can affect how the subprocess loads and executes code.
pub const DANGEROUS_ENV_VARS: &[&str] = &[
    "LD_PRELOAD",
    "LD_LIBRARY_PATH",
    "DYLD_INSERT_LIBRARIES",
    "DYLD_LIBRARY_PATH",
    "PATH",
    "NODE_OPTIONS",
    "PYTHONPATH",
    "PERL5LIB",
    "RUBYLIB",
];

/// Allowed extra CLI flags (allowlist approach)
///
/// Only these flags can be passed through the `extra_args` option.
pub const ALLOWED_EXTRA_FLAGS: &[&str] = &["timeout", "retries", "log-level", "cache-dir"];

/// Prompt input type
#[derive(Debug)]
pub enum PromptInput {
    /// Single string prompt; stdin closes right after spawn
    String(String),
    /// Stream of JSON messages over stdin
    Stream,
}

impl From<String> for PromptInput {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for PromptInput {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}
