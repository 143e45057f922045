use kdbipc_frame::Endianness;

use crate::error::{DecodeError, Result};

/// Bounded, byte-order aware cursor over one message body.
pub(crate) struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
    /// Absolute offset of `bytes[0]` within the message, for diagnostics.
    base: usize,
    endianness: Endianness,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(bytes: &'a [u8], base: usize, endianness: Endianness) -> Self {
        Self {
            bytes,
            pos: 0,
            base,
            endianness,
        }
    }

    /// Absolute message offset of the next unread byte.
    pub(crate) fn offset(&self) -> usize {
        self.base + self.pos
    }

    pub(crate) fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.pos)
    }

    /// Fail unless at least `need` bytes remain.
    pub(crate) fn ensure(&self, need: usize) -> Result<()> {
        if need > self.remaining() {
            return Err(DecodeError::TruncatedStream {
                offset: self.offset(),
                need,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }

    /// Read exactly `n` bytes and advance.
    pub(crate) fn read_exact(&mut self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n)?;
        let start = self.pos;
        self.pos += n;
        Ok(&self.bytes[start..self.pos])
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let raw = self.read_exact(N)?;
        let mut out = [0_u8; N];
        out.copy_from_slice(raw);
        Ok(out)
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub(crate) fn read_i8(&mut self) -> Result<i8> {
        Ok(i8::from_ne_bytes(self.read_array()?))
    }

    pub(crate) fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    /// Latin-1 character.
    pub(crate) fn read_char(&mut self) -> Result<char> {
        Ok(char::from(self.read_u8()?))
    }

    /// `n` bytes as Latin-1 text, one `char` per byte.
    pub(crate) fn read_latin1(&mut self, n: usize) -> Result<String> {
        Ok(self.read_exact(n)?.iter().copied().map(char::from).collect())
    }

    pub(crate) fn read_i16(&mut self) -> Result<i16> {
        let buf = self.read_array()?;
        Ok(match self.endianness {
            Endianness::Little => i16::from_le_bytes(buf),
            Endianness::Big => i16::from_be_bytes(buf),
        })
    }

    pub(crate) fn read_i32(&mut self) -> Result<i32> {
        let buf = self.read_array()?;
        Ok(match self.endianness {
            Endianness::Little => i32::from_le_bytes(buf),
            Endianness::Big => i32::from_be_bytes(buf),
        })
    }

    pub(crate) fn read_i64(&mut self) -> Result<i64> {
        let buf = self.read_array()?;
        Ok(match self.endianness {
            Endianness::Little => i64::from_le_bytes(buf),
            Endianness::Big => i64::from_be_bytes(buf),
        })
    }

    pub(crate) fn read_f32(&mut self) -> Result<f32> {
        let buf = self.read_array()?;
        Ok(match self.endianness {
            Endianness::Little => f32::from_le_bytes(buf),
            Endianness::Big => f32::from_be_bytes(buf),
        })
    }

    pub(crate) fn read_f64(&mut self) -> Result<f64> {
        let buf = self.read_array()?;
        Ok(match self.endianness {
            Endianness::Little => f64::from_le_bytes(buf),
            Endianness::Big => f64::from_be_bytes(buf),
        })
    }

    /// 16 raw bytes, never reordered.
    pub(crate) fn read_guid(&mut self) -> Result<uuid::Uuid> {
        Ok(uuid::Uuid::from_bytes(self.read_array()?))
    }

    /// Read a zero-terminated byte string without the terminator.
    pub(crate) fn read_cstring_bytes(&mut self) -> Result<&'a [u8]> {
        let start = self.pos;
        let rem = &self.bytes[self.pos.min(self.bytes.len())..];
        let Some(rel_end) = rem.iter().position(|byte| *byte == 0) else {
            return Err(DecodeError::TruncatedStream {
                offset: self.offset() + rem.len(),
                need: 1,
                remaining: 0,
            });
        };

        let end = start + rel_end;
        self.pos = end + 1;
        Ok(&self.bytes[start..end])
    }

    pub(crate) fn read_cstring(&mut self) -> Result<String> {
        Ok(String::from_utf8_lossy(self.read_cstring_bytes()?).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_in_declared_byte_order() {
        let bytes = [0x00, 0x00, 0x00, 0x01];
        let mut little = Cursor::new(&bytes, 0, Endianness::Little);
        let mut big = Cursor::new(&bytes, 0, Endianness::Big);

        assert_eq!(little.read_i32().unwrap(), 0x0100_0000);
        assert_eq!(big.read_i32().unwrap(), 1);
    }

    #[test]
    fn floats_follow_byte_order() {
        let bytes = 0.5_f64.to_be_bytes();
        let mut cursor = Cursor::new(&bytes, 0, Endianness::Big);
        assert_eq!(cursor.read_f64().unwrap(), 0.5);

        let bytes = 1.5_f32.to_le_bytes();
        let mut cursor = Cursor::new(&bytes, 0, Endianness::Little);
        assert_eq!(cursor.read_f32().unwrap(), 1.5);
    }

    #[test]
    fn guid_bytes_are_not_reordered() {
        let raw: [u8; 16] = [
            0xdd, 0xb8, 0x79, 0x15, 0xb6, 0x72, 0x2c, 0x32, 0xa6, 0xcf, 0x29, 0x60, 0x61, 0x67,
            0x1e, 0x9d,
        ];
        for endianness in [Endianness::Little, Endianness::Big] {
            let mut cursor = Cursor::new(&raw, 0, endianness);
            assert_eq!(
                cursor.read_guid().unwrap().to_string(),
                "ddb87915-b672-2c32-a6cf-296061671e9d"
            );
        }
    }

    #[test]
    fn cstring_consumes_terminator() {
        let bytes = b"abc\0bc\0";
        let mut cursor = Cursor::new(bytes, 8, Endianness::Little);

        assert_eq!(cursor.read_cstring().unwrap(), "abc");
        assert_eq!(cursor.offset(), 12);
        assert_eq!(cursor.read_cstring().unwrap(), "bc");
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn empty_cstring() {
        let mut cursor = Cursor::new(b"\0", 0, Endianness::Little);
        assert_eq!(cursor.read_cstring().unwrap(), "");
    }

    #[test]
    fn unterminated_cstring_is_truncated() {
        let mut cursor = Cursor::new(b"abc", 8, Endianness::Little);
        let err = cursor.read_cstring().unwrap_err();
        assert!(matches!(
            err,
            DecodeError::TruncatedStream {
                offset: 11,
                need: 1,
                remaining: 0
            }
        ));
    }

    #[test]
    fn short_read_reports_absolute_offset() {
        let mut cursor = Cursor::new(&[0x01, 0x02], 8, Endianness::Little);
        cursor.read_u8().unwrap();
        let err = cursor.read_i32().unwrap_err();
        assert!(matches!(
            err,
            DecodeError::TruncatedStream {
                offset: 9,
                need: 4,
                remaining: 1
            }
        ));
    }

    #[test]
    fn latin1_char() {
        let mut cursor = Cursor::new(&[0x61, 0xe9], 0, Endianness::Little);
        assert_eq!(cursor.read_char().unwrap(), 'a');
        assert_eq!(cursor.read_char().unwrap(), 'é');
    }

    #[test]
    fn latin1_text_keeps_one_char_per_byte() {
        let mut cursor = Cursor::new(&[0x63, 0x61, 0x66, 0xe9, 0xff], 0, Endianness::Little);
        let text = cursor.read_latin1(5).unwrap();

        assert_eq!(text, "caf\u{e9}\u{ff}");
        assert_eq!(text.chars().count(), 5);
        assert_eq!(cursor.remaining(), 0);
    }
}
