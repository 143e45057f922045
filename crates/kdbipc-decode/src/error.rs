use kdbipc_frame::{FrameError, HEADER_SIZE};

/// Errors that can occur while decoding a kdb+ IPC message.
///
/// Offsets are absolute message offsets, envelope bytes included.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Malformed or too-short envelope.
    #[error("frame error: {0}")]
    Frame(FrameError),

    /// Input ended before a declared count or length was satisfied.
    #[error("truncated stream at offset {offset}: need {need} bytes, {remaining} remaining")]
    TruncatedStream {
        offset: usize,
        need: usize,
        remaining: usize,
    },

    /// Unrecognized type code byte.
    #[error("unknown type code {code} at offset {offset}")]
    UnknownType { code: i8, offset: usize },

    /// The remote side sent an error signal instead of a value.
    ///
    /// Displays the remote text verbatim.
    #[error("{0}")]
    Protocol(String),

    /// Attribute byte outside 0..=4.
    #[error("invalid attribute byte {byte} at offset {offset}")]
    InvalidAttribute { byte: u8, offset: usize },

    /// Negative element count.
    #[error("invalid element count {count} at offset {offset}")]
    InvalidCount { count: i32, offset: usize },

    /// Values nested deeper than the configured ceiling.
    #[error("nesting depth exceeded (max={max_depth})")]
    DepthExceeded { max_depth: u32 },

    /// Cumulative element count for the message exceeded the configured ceiling.
    #[error("too many elements: count={count}, max={max}")]
    TooManyElements { count: usize, max: usize },

    /// A temporal value cannot be represented as a calendar instant or date.
    #[error("{kind} value at offset {offset} is outside the representable range")]
    TemporalOutOfRange { kind: &'static str, offset: usize },

    /// A nested value did not have the shape its container requires.
    #[error("expected {expected} at offset {offset}, found type code {found}")]
    UnexpectedShape {
        expected: &'static str,
        found: i8,
        offset: usize,
    },
}

impl From<FrameError> for DecodeError {
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::IncompleteBody { expected, received } => DecodeError::TruncatedStream {
                offset: HEADER_SIZE + received,
                need: expected - received,
                remaining: 0,
            },
            other => DecodeError::Frame(other),
        }
    }
}

impl From<std::io::Error> for DecodeError {
    fn from(err: std::io::Error) -> Self {
        DecodeError::Frame(FrameError::Io(err))
    }
}

impl DecodeError {
    /// True for an intentional remote error signal rather than a malformed message.
    pub fn is_protocol(&self) -> bool {
        matches!(self, DecodeError::Protocol(_))
    }
}

pub type Result<T> = std::result::Result<T, DecodeError>;
