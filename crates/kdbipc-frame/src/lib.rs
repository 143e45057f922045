//! kdb+ IPC message envelope handling.
//!
//! Every kdb+ IPC message starts with an 8-byte envelope:
//! - 1 byte endianness flag (1 = little, 0 = big) governing the whole message
//! - 1 byte message kind (async, sync, response)
//! - 2 reserved bytes
//! - a 4-byte total length (header included) in the declared byte order
//!
//! This crate turns a byte stream into whole [`Message`]s; decoding the body
//! into values lives in `kdbipc-decode`.

pub mod codec;
pub mod error;
pub mod header;
pub mod reader;

#[cfg(feature = "async")]
pub use codec::MessageCodec;
pub use codec::{decode_message, FrameConfig, Message, DEFAULT_MAX_MESSAGE};
pub use error::{FrameError, Result};
pub use header::{Endianness, MessageHeader, MessageKind, HEADER_SIZE};
pub use reader::MessageReader;
