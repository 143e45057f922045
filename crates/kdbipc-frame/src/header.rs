use crate::error::{FrameError, Result};

/// Envelope size: endianness (1) + kind (1) + reserved (2) + length (4) = 8 bytes.
pub const HEADER_SIZE: usize = 8;

/// Byte order governing every multi-byte field of one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    /// Flag byte `0x01`.
    Little,
    /// Flag byte `0x00`.
    Big,
}

impl Endianness {
    /// Parse the envelope's first byte.
    pub fn from_flag(flag: u8) -> Result<Self> {
        match flag {
            1 => Ok(Self::Little),
            0 => Ok(Self::Big),
            other => Err(FrameError::InvalidEndianness(other)),
        }
    }

    /// The envelope flag byte for this byte order.
    pub fn flag(self) -> u8 {
        match self {
            Self::Little => 1,
            Self::Big => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Little => "little",
            Self::Big => "big",
        }
    }
}

/// Message kind carried in the second envelope byte.
///
/// Informational only; the decoder never changes behavior based on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Async,
    Sync,
    Response,
    Other(u8),
}

impl MessageKind {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0 => Self::Async,
            1 => Self::Sync,
            2 => Self::Response,
            other => Self::Other(other),
        }
    }

    pub fn as_byte(self) -> u8 {
        match self {
            Self::Async => 0,
            Self::Sync => 1,
            Self::Response => 2,
            Self::Other(byte) => byte,
        }
    }
}

/// Parsed 8-byte message envelope.
///
/// Wire format:
/// ```text
/// ┌──────────┬──────────┬────────────┬──────────────────────────┐
/// │ Endian   │ Kind     │ Reserved   │ Length (4B, total bytes  │
/// │ (1B)     │ (1B)     │ (2B)       │ incl. header, in Endian) │
/// └──────────┴──────────┴────────────┴──────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    pub endianness: Endianness,
    pub kind: MessageKind,
    pub reserved: [u8; 2],
    /// Total message length, header included.
    pub length: u32,
}

impl MessageHeader {
    /// Parse the envelope from the first [`HEADER_SIZE`] bytes of `bytes`.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let Some(raw) = bytes.get(..HEADER_SIZE) else {
            return Err(FrameError::IncompleteHeader {
                received: bytes.len(),
            });
        };

        let endianness = Endianness::from_flag(raw[0])?;
        let kind = MessageKind::from_byte(raw[1]);
        let reserved = [raw[2], raw[3]];
        let length_bytes = [raw[4], raw[5], raw[6], raw[7]];
        let length = match endianness {
            Endianness::Little => u32::from_le_bytes(length_bytes),
            Endianness::Big => u32::from_be_bytes(length_bytes),
        };

        if (length as usize) < HEADER_SIZE {
            return Err(FrameError::InvalidLength { length });
        }

        Ok(Self {
            endianness,
            kind,
            reserved,
            length,
        })
    }

    /// Number of body bytes following the envelope.
    pub fn body_len(&self) -> usize {
        self.length as usize - HEADER_SIZE
    }

    /// Reject messages whose declared length exceeds `max`.
    pub fn check_size(&self, max: usize) -> Result<()> {
        let size = self.length as usize;
        if size > max {
            return Err(FrameError::MessageTooLarge { size, max });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_little_endian_header() {
        let header = MessageHeader::parse(&[0x01, 0x02, 0x00, 0x00, 0x0a, 0x00, 0x00, 0x00])
            .expect("header parses");
        assert_eq!(header.endianness, Endianness::Little);
        assert_eq!(header.kind, MessageKind::Response);
        assert_eq!(header.length, 10);
        assert_eq!(header.body_len(), 2);
    }

    #[test]
    fn parses_big_endian_header() {
        let header = MessageHeader::parse(&[0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x01, 0x02])
            .expect("header parses");
        assert_eq!(header.endianness, Endianness::Big);
        assert_eq!(header.kind, MessageKind::Sync);
        assert_eq!(header.length, 258);
    }

    #[test]
    fn keeps_reserved_bytes_and_unknown_kind() {
        let header = MessageHeader::parse(&[0x01, 0x07, 0xaa, 0xbb, 0x08, 0x00, 0x00, 0x00])
            .expect("header parses");
        assert_eq!(header.kind, MessageKind::Other(7));
        assert_eq!(header.kind.as_byte(), 7);
        assert_eq!(header.reserved, [0xaa, 0xbb]);
        assert_eq!(header.body_len(), 0);
    }

    #[test]
    fn rejects_short_header() {
        let err = MessageHeader::parse(&[0x01, 0x00, 0x00]).unwrap_err();
        assert!(matches!(err, FrameError::IncompleteHeader { received: 3 }));
    }

    #[test]
    fn rejects_invalid_endianness_flag() {
        let err = MessageHeader::parse(&[0x02, 0x00, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00])
            .unwrap_err();
        assert!(matches!(err, FrameError::InvalidEndianness(0x02)));
    }

    #[test]
    fn rejects_length_smaller_than_header() {
        let err = MessageHeader::parse(&[0x01, 0x00, 0x00, 0x00, 0x07, 0x00, 0x00, 0x00])
            .unwrap_err();
        assert!(matches!(err, FrameError::InvalidLength { length: 7 }));
    }

    #[test]
    fn check_size_enforces_maximum() {
        let header = MessageHeader::parse(&[0x01, 0x00, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00])
            .expect("header parses");
        assert!(header.check_size(1024).is_ok());
        assert!(matches!(
            header.check_size(1023),
            Err(FrameError::MessageTooLarge {
                size: 1024,
                max: 1023
            })
        ));
    }

    #[test]
    fn endianness_flag_roundtrips() {
        for endianness in [Endianness::Little, Endianness::Big] {
            assert_eq!(Endianness::from_flag(endianness.flag()).unwrap(), endianness);
        }
    }
}
