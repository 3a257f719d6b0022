//! Control protocol: message types and the request bridge

pub mod handler;
pub mod messages;

pub use handler::ControlBridge;
pub use messages::{ControlRequestInner, ControlResponsePayload, OutboundControlRequest};
