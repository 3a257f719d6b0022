//! Message decoding for the wire protocol

pub mod parser;

pub use parser::{decode_line, parse_message};
