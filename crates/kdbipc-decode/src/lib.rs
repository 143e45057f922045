//! Decoding of kdb+ IPC message bodies into typed values.
//!
//! A body is a single value tagged with a signed type code:
//! - negative codes are atoms (`-128` is a remote error signal)
//! - `0` is a general list, `1..=19` are typed vectors
//! - `98` table, `99`/`127` dictionary, `100` lambda
//!
//! Multi-byte quantities follow the byte order declared in the envelope.
//! Temporal values are offsets from 2000-01-01 and are converted to `chrono`
//! types. Decoding is bounded by [`DecodeOptions`]: nesting depth, total
//! element count, and every declared count is checked against the bytes
//! actually present before anything is allocated.

mod cursor;

pub mod codec;
pub mod decoder;
pub mod error;
pub mod temporal;
pub mod types;
pub mod value;

#[cfg(feature = "async")]
pub use codec::ValueCodec;
pub use codec::decode_buffer;
pub use decoder::{decode, decode_message, decode_value, decode_with_options, DecodeOptions};
pub use error::{DecodeError, Result};
pub use temporal::{Month, Temporal};
pub use types::{Attribute, BaseType};
pub use value::{Atom, Data, Dict, Function, KeyedTable, Table, Value, Vector};
