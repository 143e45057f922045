use bytes::BytesMut;
use kdbipc_frame::MessageHeader;

use crate::decoder::{decode_message, DecodeOptions};
use crate::error::Result;
use crate::value::Value;

/// Split one message off the front of `src` and decode it.
///
/// Returns `Ok(None)` until `src` holds a complete message. A message that
/// fails to decode is still consumed, so the buffer stays aligned on the
/// next envelope.
pub fn decode_buffer(
    src: &mut BytesMut,
    options: &DecodeOptions,
) -> Result<Option<(MessageHeader, Value)>> {
    let Some(message) = kdbipc_frame::decode_message(src, options.frame.max_message_size)? else {
        return Ok(None);
    };

    let value = decode_message(&message, options)?;
    Ok(Some((message.header, value)))
}

/// `tokio_util` codec yielding decoded values with their envelopes.
#[cfg(feature = "async")]
#[derive(Debug, Clone, Default)]
pub struct ValueCodec {
    options: DecodeOptions,
}

#[cfg(feature = "async")]
impl ValueCodec {
    pub fn new(options: DecodeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }
}

#[cfg(feature = "async")]
impl tokio_util::codec::Decoder for ValueCodec {
    type Item = (MessageHeader, Value);
    type Error = crate::error::DecodeError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        decode_buffer(src, &self.options)
    }
}

#[cfg(test)]
mod tests {
    use bytes::BufMut;
    use kdbipc_frame::{FrameError, MessageKind, HEADER_SIZE};

    use super::*;
    use crate::error::DecodeError;
    use crate::value::{Atom, Vector};

    fn push_message(buf: &mut BytesMut, body: &[u8]) {
        buf.put_slice(&[0x01, 0x02, 0x00, 0x00]);
        buf.put_u32_le((HEADER_SIZE + body.len()) as u32);
        buf.put_slice(body);
    }

    #[test]
    fn waits_for_complete_message() {
        let mut full = BytesMut::new();
        push_message(&mut full, b"\xf5GOOG\x00");

        let mut buf = BytesMut::from(&full[..HEADER_SIZE + 3]);
        assert!(decode_buffer(&mut buf, &DecodeOptions::default())
            .unwrap()
            .is_none());

        buf.extend_from_slice(&full[HEADER_SIZE + 3..]);
        let (header, value) = decode_buffer(&mut buf, &DecodeOptions::default())
            .unwrap()
            .unwrap();
        assert_eq!(header.kind, MessageKind::Response);
        assert_eq!(value.as_atom(), Some(&Atom::Symbol("GOOG".into())));
        assert!(buf.is_empty());
    }

    #[test]
    fn failed_message_is_consumed() {
        let mut buf = BytesMut::new();
        push_message(&mut buf, b"\x80type\x00");
        push_message(&mut buf, &[0xff, 0x01]);

        let err = decode_buffer(&mut buf, &DecodeOptions::default()).unwrap_err();
        assert!(err.is_protocol());

        let (_, value) = decode_buffer(&mut buf, &DecodeOptions::default())
            .unwrap()
            .unwrap();
        assert_eq!(value.as_atom(), Some(&Atom::Boolean(true)));
    }

    #[test]
    fn oversized_envelope_is_frame_error() {
        let mut buf = BytesMut::new();
        push_message(&mut buf, &[0x04, 0x00, 0x00, 0x00, 0x00, 0x00]);

        let options = DecodeOptions {
            frame: kdbipc_frame::FrameConfig {
                max_message_size: 8,
            },
            ..DecodeOptions::default()
        };
        let err = decode_buffer(&mut buf, &options).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Frame(FrameError::MessageTooLarge { size: 14, max: 8 })
        ));
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn codec_streams_values() {
        use futures_util::StreamExt;
        use tokio_util::codec::FramedRead;

        let mut wire = BytesMut::new();
        push_message(&mut wire, &[0x04, 0x00, 0x02, 0x00, 0x00, 0x00, 0x01, 0x02]);
        push_message(&mut wire, b"\xf5x\x00");
        let wire = wire.to_vec();

        let mut framed = FramedRead::new(wire.as_slice(), ValueCodec::default());
        let (_, first) = framed.next().await.unwrap().unwrap();
        let (_, second) = framed.next().await.unwrap().unwrap();

        assert_eq!(first.as_vector(), Some(&Vector::Byte(vec![1, 2])));
        assert_eq!(second.as_atom(), Some(&Atom::Symbol("x".into())));
        assert!(framed.next().await.is_none());
    }
}
