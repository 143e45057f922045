//! Decoder for the kdb+ IPC binary wire format.
//!
//! kdbipc turns the bytes a q process sends (a query response, a published
//! update, a remote error) into a typed [`Value`] tree.
//!
//! # Crate Structure
//!
//! - [`frame`] - Message envelope parsing and whole-message reading
//! - [`decode`] - Value model, temporal conversion and the recursive decoder
//!
//! ```no_run
//! let mut stream = std::io::stdin().lock();
//! match kdbipc::decode(&mut stream) {
//!     Ok(value) => println!("{value:?}"),
//!     Err(err) if err.is_protocol() => eprintln!("q error: {err}"),
//!     Err(err) => eprintln!("malformed message: {err}"),
//! }
//! ```

/// Re-export frame types.
pub mod frame {
    pub use kdbipc_frame::*;
}

/// Re-export decode types.
pub mod decode {
    pub use kdbipc_decode::*;
}

pub use kdbipc_decode::{
    decode, decode_with_options, Atom, Data, DecodeError, DecodeOptions, Value, Vector,
};
