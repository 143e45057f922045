/// Errors that can occur while reading a kdb+ IPC message envelope.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The stream ended before all 8 header bytes arrived.
    #[error("incomplete message header ({received} of 8 bytes)")]
    IncompleteHeader { received: usize },

    /// The first header byte is neither 0 (big-endian) nor 1 (little-endian).
    #[error("invalid endianness flag {0:#04x} (expected 0x00 or 0x01)")]
    InvalidEndianness(u8),

    /// The declared total length cannot even hold the header.
    #[error("invalid message length {length} (must be at least 8)")]
    InvalidLength { length: u32 },

    /// The declared total length exceeds the configured maximum.
    #[error("message too large ({size} bytes, max {max})")]
    MessageTooLarge { size: usize, max: usize },

    /// The stream ended before the declared message length was satisfied.
    #[error("incomplete message body ({received} of {expected} bytes)")]
    IncompleteBody { expected: usize, received: usize },

    /// An I/O error occurred while reading the message.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream was closed before a new message started.
    #[error("connection closed")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
