//! Plain-text decoding.

use encoding_rs::UTF_8;
use tracing::warn;

/// Decode UTF-8 bytes, dropping a leading BOM.
///
/// Malformed sequences become U+FFFD rather than failing the upload.
pub fn decode_plain_text(data: &[u8], name: &str) -> String {
    let (text, had_errors) = UTF_8.decode_with_bom_removal(data);
    if had_errors {
        warn!("'{}' is not valid UTF-8; invalid bytes were replaced", name);
    }
    text.into_owned()
}
