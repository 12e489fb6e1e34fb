//! Hex text ⇄ raw bytes, for WKB exchanged as hex strings (e.g. PostGIS output).

use crate::error::Result;

/// Decode a hex string (either case) into raw bytes.
///
/// # Example
///
/// ```
/// use geowkb_core::hex::{decode_hex, encode_hex};
///
/// let raw = decode_hex("0101000000").unwrap();
/// assert_eq!(raw, vec![1, 1, 0, 0, 0]);
/// assert_eq!(encode_hex(&raw), "0101000000");
/// ```
pub fn decode_hex(text: &str) -> Result<Vec<u8>> {
    Ok(::hex::decode(text.trim())?)
}

/// Encode raw bytes as upper-case hex.
pub fn encode_hex(bytes: &[u8]) -> String {
    ::hex::encode_upper(bytes)
}

/// Decode many hex strings, stopping at the first malformed one.
pub fn decode_hex_batch<S: AsRef<str>>(texts: &[S]) -> Result<Vec<Vec<u8>>> {
    texts.iter().map(|t| decode_hex(t.as_ref())).collect()
}
