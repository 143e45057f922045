use bytes::{Bytes, BytesMut};

use crate::error::Result;
use crate::header::{MessageHeader, HEADER_SIZE};

/// Default maximum message size: 256 MiB.
pub const DEFAULT_MAX_MESSAGE: usize = 256 * 1024 * 1024;

/// One complete message: parsed envelope plus the raw body bytes.
#[derive(Debug, Clone)]
pub struct Message {
    pub header: MessageHeader,
    /// Everything after the envelope, exactly `header.body_len()` bytes.
    pub body: Bytes,
}

impl Message {
    /// The total wire size of this message (header + body).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.body.len()
    }
}

/// Split one message off the front of an accumulated buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete message yet.
/// On success, consumes the message bytes from the buffer.
pub fn decode_message(src: &mut BytesMut, max_message_size: usize) -> Result<Option<Message>> {
    if src.len() < HEADER_SIZE {
        return Ok(None);
    }

    let header = MessageHeader::parse(&src[..HEADER_SIZE])?;
    header.check_size(max_message_size)?;

    let total = header.length as usize;
    if src.len() < total {
        src.reserve(total - src.len());
        return Ok(None);
    }

    let mut raw = src.split_to(total);
    let body = raw.split_off(HEADER_SIZE).freeze();

    Ok(Some(Message { header, body }))
}

/// Configuration for message reading.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum total message size in bytes. Default: 256 MiB.
    pub max_message_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_message_size: DEFAULT_MAX_MESSAGE,
        }
    }
}

/// `tokio_util` codec splitting a byte stream into [`Message`]s.
#[cfg(feature = "async")]
#[derive(Debug, Clone, Default)]
pub struct MessageCodec {
    config: FrameConfig,
}

#[cfg(feature = "async")]
impl MessageCodec {
    pub fn new(config: FrameConfig) -> Self {
        Self { config }
    }
}

#[cfg(feature = "async")]
impl tokio_util::codec::Decoder for MessageCodec {
    type Item = Message;
    type Error = crate::error::FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Message>> {
        decode_message(src, self.config.max_message_size)
    }
}
