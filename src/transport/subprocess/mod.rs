//! Subprocess transport over the agent CLI

mod command;
mod config;
mod lifecycle;
mod reader;
mod transport;

pub use command::CommandBuilder;
pub use config::{
    ALLOWED_EXTRA_FLAGS, DANGEROUS_ENV_VARS, DEFAULT_CHANNEL_CAPACITY, DEFAULT_MAX_BUFFER_SIZE,
    PromptInput,
};
pub use transport::SubprocessTransport;
