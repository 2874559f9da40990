//! Errors from encoding, decoding and slot access.

use thiserror::Error;

/// Failure in the bitstring codec.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The text is not valid base64url.
    #[error("encodedList is not valid base64url: {0}")]
    Base64(String),

    /// The decoded bytes are not a valid GZIP stream.
    #[error("encodedList is not a valid GZIP stream: {0}")]
    Decompress(#[source] std::io::Error),

    /// Compression failed.
    #[error("bitstring compression failed: {0}")]
    Compress(#[source] std::io::Error),

    /// The decompressed bitstring exceeds the accepted ceiling.
    #[error("decoded bitstring exceeds {limit} bytes")]
    TooLarge {
        /// Ceiling in bytes.
        limit: usize,
    },

    /// A slot index addresses bits beyond the end of the buffer.
    #[error("status index {index} is out of range for a bitstring of {capacity} slots")]
    IndexOutOfRange {
        /// Requested slot.
        index: u64,
        /// Number of whole slots the buffer holds.
        capacity: u64,
    },

    /// A code does not fit in the slot width.
    #[error("status value {value} does not fit in {bits} bits")]
    ValueTooWide {
        /// Code being written.
        value: u8,
        /// Slot width in bits.
        bits: u8,
    },
}
