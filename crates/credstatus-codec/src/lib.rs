//! # credstatus-codec — Bitstring Codec
//!
//! Two layers, both pure functions:
//!
//! - **Packing** ([`packing`]): reads and writes fixed-width status codes at
//!   slot indices inside a raw byte buffer. Slot `i` of width `w` starts at
//!   bit `i * w`; bits are numbered most-significant-first within each byte,
//!   so index 0 is the left-most bit of the first byte, and a multi-bit code
//!   is stored with its most significant bit first.
//! - **Text encoding** ([`bitstring`]): GZIP compression followed by
//!   multibase base64url (`u` prefix, no padding), the `encodedList` format
//!   of Bitstring Status List v1.0.
//!
//! Malformed input is always an explicit [`CodecError`], never a
//! truncated or zero-filled buffer.

pub mod bitstring;
pub mod error;
pub mod packing;

pub use bitstring::{decode, encode, MAX_DECODED_LEN};
pub use error::CodecError;
pub use packing::{buffer_len, read_status, write_status, zeroed};
