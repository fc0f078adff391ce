//! PDF payload codec
//!
//! PDF bytes are stored in a TEXT column, so they pass through a text-safe
//! encoding on the way in and back out. The round trip is lossless for any
//! byte sequence, including empty and non-UTF8 content.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

/// Encode raw PDF bytes for storage in a text column.
pub fn encode(raw: &[u8]) -> String {
    BASE64.encode(raw)
}

/// Decode a stored payload back to raw bytes.
pub fn decode(text: &str) -> Result<Vec<u8>, base64::DecodeError> {
    BASE64.decode(text)
}
