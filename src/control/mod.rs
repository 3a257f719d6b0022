//! Control channel handling
//!
//! The control channel shares the process's stdin/stdout with conversation
//! messages. This module owns the inbound side: classifying control
//! requests and answering each one exactly once.

pub mod protocol;

pub use protocol::{ControlBridge, ControlRequestInner, ControlResponsePayload, OutboundControlRequest};
