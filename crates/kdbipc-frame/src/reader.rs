use std::io::{ErrorKind, Read};

use bytes::BytesMut;
use tracing::debug;

use crate::codec::{FrameConfig, Message};
use crate::error::{FrameError, Result};
use crate::header::{MessageHeader, HEADER_SIZE};

const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Reads complete messages from any `Read` stream.
///
/// Reads exactly one message worth of bytes per call and never past it, so
/// the underlying stream is left positioned at the next message.
pub struct MessageReader<T> {
    inner: T,
    config: FrameConfig,
}

impl<T: Read> MessageReader<T> {
    /// Create a new message reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new message reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self { inner, config }
    }

    /// Read the next complete message (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached before
    /// the first header byte.
    pub fn read_message(&mut self) -> Result<Message> {
        let mut head = BytesMut::with_capacity(HEADER_SIZE);
        let received = fill(&mut self.inner, &mut head, HEADER_SIZE)?;
        if received == 0 {
            return Err(FrameError::ConnectionClosed);
        }
        if received < HEADER_SIZE {
            return Err(FrameError::IncompleteHeader { received });
        }

        let header = MessageHeader::parse(&head)?;
        header.check_size(self.config.max_message_size)?;
        debug!(
            endianness = header.endianness.as_str(),
            kind = header.kind.as_byte(),
            length = header.length,
            "read message header"
        );

        let expected = header.body_len();
        let mut body = BytesMut::with_capacity(expected.min(READ_CHUNK_SIZE));
        let received = fill(&mut self.inner, &mut body, expected)?;
        if received < expected {
            return Err(FrameError::IncompleteBody { expected, received });
        }

        Ok(Message {
            header,
            body: body.freeze(),
        })
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Update maximum message size for subsequent reads.
    pub fn set_max_message_size(&mut self, max_message_size: usize) {
        self.config.max_message_size = max_message_size;
    }

    /// Current message reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

/// Append up to `want` bytes to `buf`, stopping early only at EOF.
///
/// Returns the number of bytes appended.
fn fill<T: Read>(inner: &mut T, buf: &mut BytesMut, want: usize) -> Result<usize> {
    let mut chunk = [0u8; READ_CHUNK_SIZE];
    let mut received = 0usize;

    while received < want {
        let limit = (want - received).min(READ_CHUNK_SIZE);
        let read = match inner.read(&mut chunk[..limit]) {
            Ok(n) => n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        };

        if read == 0 {
            break;
        }

        buf.extend_from_slice(&chunk[..read]);
        received += read;
    }

    Ok(received)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use bytes::BufMut;

    use super::*;
    use crate::header::Endianness;

    fn wire(body: &[u8]) -> Vec<u8> {
        let mut buf = BytesMut::new();
        buf.put_slice(&[0x01, 0x02, 0x00, 0x00]);
        buf.put_u32_le((HEADER_SIZE + body.len()) as u32);
        buf.put_slice(body);
        buf.to_vec()
    }

    #[test]
    fn read_single_message() {
        let mut reader = MessageReader::new(Cursor::new(wire(&[0xff, 0x00])));
        let message = reader.read_message().unwrap();

        assert_eq!(message.header.endianness, Endianness::Little);
        assert_eq!(message.body.as_ref(), &[0xff, 0x00]);
    }

    #[test]
    fn leaves_stream_positioned_after_message() {
        let mut bytes = wire(&[0xff, 0x01]);
        bytes.extend_from_slice(&[0xde, 0xad]);

        let mut reader = MessageReader::new(Cursor::new(bytes));
        reader.read_message().unwrap();

        assert_eq!(reader.get_ref().position(), 10);
    }

    #[test]
    fn read_multiple_messages() {
        let mut bytes = wire(&[0xff, 0x01]);
        bytes.extend(wire(b"\xf5GOOG\x00"));

        let mut reader = MessageReader::new(Cursor::new(bytes));
        let first = reader.read_message().unwrap();
        let second = reader.read_message().unwrap();

        assert_eq!(first.body.as_ref(), &[0xff, 0x01]);
        assert_eq!(second.body.as_ref(), b"\xf5GOOG\x00");
        assert!(matches!(
            reader.read_message().unwrap_err(),
            FrameError::ConnectionClosed
        ));
    }

    #[test]
    fn read_message_with_large_body() {
        let body = vec![0xAB; 64 * 1024];
        let mut reader = MessageReader::new(Cursor::new(wire(&body)));
        let message = reader.read_message().unwrap();

        assert_eq!(message.body.as_ref(), body.as_slice());
    }

    #[test]
    fn partial_read_handling() {
        let byte_reader = ByteByByteReader {
            bytes: wire(b"\xf5GOOG\x00"),
            pos: 0,
        };
        let mut reader = MessageReader::new(byte_reader);

        let message = reader.read_message().unwrap();
        assert_eq!(message.body.as_ref(), b"\xf5GOOG\x00");
    }

    #[test]
    fn connection_closed_cleanly() {
        let mut reader = MessageReader::new(Cursor::new(Vec::<u8>::new()));
        let err = reader.read_message().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn connection_closed_mid_header() {
        let mut reader = MessageReader::new(Cursor::new(vec![0x01, 0x00, 0x00, 0x00, 0x0a]));
        let err = reader.read_message().unwrap_err();
        assert!(matches!(err, FrameError::IncompleteHeader { received: 5 }));
    }

    #[test]
    fn connection_closed_mid_body() {
        let mut bytes = wire(b"\xf5GOOG\x00");
        bytes.truncate(HEADER_SIZE + 3);

        let mut reader = MessageReader::new(Cursor::new(bytes));
        let err = reader.read_message().unwrap_err();
        assert!(matches!(
            err,
            FrameError::IncompleteBody {
                expected: 6,
                received: 3
            }
        ));
    }

    #[test]
    fn oversized_message_in_stream() {
        let mut buf = BytesMut::new();
        buf.put_slice(&[0x01, 0x00, 0x00, 0x00]);
        buf.put_u32_le(1024);

        let cfg = FrameConfig {
            max_message_size: 16,
        };
        let mut reader = MessageReader::with_config(Cursor::new(buf.to_vec()), cfg);
        let err = reader.read_message().unwrap_err();
        assert!(matches!(err, FrameError::MessageTooLarge { .. }));
    }

    #[test]
    fn set_max_message_size_applies_to_next_read() {
        let mut reader = MessageReader::new(Cursor::new(wire(&[0xff, 0x00])));
        reader.set_max_message_size(9);
        assert_eq!(reader.config().max_message_size, 9);

        let err = reader.read_message().unwrap_err();
        assert!(matches!(err, FrameError::MessageTooLarge { size: 10, max: 9 }));
    }

    #[test]
    fn interrupted_read_retries() {
        let reader = InterruptedThenData {
            state: 0,
            bytes: wire(&[0xff, 0x01]),
            pos: 0,
        };
        let mut framed = MessageReader::new(reader);
        let message = framed.read_message().unwrap();

        assert_eq!(message.body.as_ref(), &[0xff, 0x01]);
    }

    #[test]
    fn would_block_propagates_io_error() {
        let mut framed = MessageReader::new(WouldBlockReader);
        let err = framed.read_message().unwrap_err();
        assert!(matches!(err, FrameError::Io(e) if e.kind() == ErrorKind::WouldBlock));
    }

    #[test]
    fn accessors_and_into_inner() {
        let cursor = Cursor::new(Vec::<u8>::new());
        let mut reader = MessageReader::new(cursor);

        let _ = reader.get_ref();
        let _ = reader.get_mut();
        let _inner = reader.into_inner();
    }

    #[derive(Debug)]
    struct ByteByByteReader {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for ByteByByteReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.bytes.len() || buf.is_empty() {
                return Ok(0);
            }

            buf[0] = self.bytes[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    struct InterruptedThenData {
        state: u8,
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for InterruptedThenData {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.state == 0 {
                self.state = 1;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            if self.pos >= self.bytes.len() {
                return Ok(0);
            }
            let remaining = self.bytes.len() - self.pos;
            let n = remaining.min(buf.len());
            buf[..n].copy_from_slice(&self.bytes[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    struct WouldBlockReader;

    impl Read for WouldBlockReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(ErrorKind::WouldBlock))
        }
    }
}
