//! # Bitstring Text Encoding
//!
//! `encodedList` is the GZIP-compressed bitstring, base64url-encoded
//! without padding and prefixed with the multibase code `u`. Status lists
//! are overwhelmingly zero, so a 16 KB single-bit list with a handful of
//! revocations compresses to a few hundred bytes.
//!
//! [`decode`] is lenient about presentation (with or without the `u`
//! prefix, with or without `=` padding) and strict about content: any
//! base64 or GZIP defect is an error.

use std::io::{self, Read, Write};

use base64ct::{Base64UrlUnpadded, Encoding};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::CodecError;

/// Multibase prefix for base64url without padding.
const MULTIBASE_BASE64URL: char = 'u';

/// Largest decompressed bitstring [`decode`] will produce (64 MiB).
pub const MAX_DECODED_LEN: usize = 64 * 1024 * 1024;

/// Compress `buffer` and encode it as multibase base64url text.
///
/// The GZIP header carries no timestamp, so equal buffers encode to equal
/// text.
pub fn encode(buffer: &[u8]) -> Result<String, CodecError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(buffer).map_err(CodecError::Compress)?;
    let compressed = encoder.finish().map_err(CodecError::Compress)?;

    let mut text = String::with_capacity(1 + compressed.len() * 4 / 3 + 4);
    text.push(MULTIBASE_BASE64URL);
    text.push_str(&Base64UrlUnpadded::encode_string(&compressed));
    Ok(text)
}

/// Decode text produced by [`encode`] back into the original bytes.
pub fn decode(text: &str) -> Result<Vec<u8>, CodecError> {
    let body = text.trim();
    // A GZIP stream always starts with 0x1f, which base64-encodes to 'H', so
    // a leading 'u' can only be the multibase prefix.
    let body = body.strip_prefix(MULTIBASE_BASE64URL).unwrap_or(body);
    let body = body.trim_end_matches('=');

    let compressed =
        Base64UrlUnpadded::decode_vec(body).map_err(|e| CodecError::Base64(e.to_string()))?;
    if compressed.is_empty() {
        return Err(CodecError::Decompress(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "empty GZIP stream",
        )));
    }

    let limit = MAX_DECODED_LEN as u64;
    let mut decoder = GzDecoder::new(compressed.as_slice()).take(limit + 1);
    let mut buffer = Vec::new();
    decoder
        .read_to_end(&mut buffer)
        .map_err(CodecError::Decompress)?;
    if buffer.len() > MAX_DECODED_LEN {
        return Err(CodecError::TooLarge {
            limit: MAX_DECODED_LEN,
        });
    }
    Ok(buffer)
}
