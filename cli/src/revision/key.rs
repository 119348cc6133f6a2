//! Decoding of object keys as they arrive in upload notifications.
//!
//! Notification keys are form-encoded: spaces arrive as `+` and every other
//! reserved byte as a `%XX` escape.
use crate::core::error::{Result, TmplverError};
use percent_encoding::percent_decode_str;

/// Decodes a form-encoded object key (`my+env%2Fbundle.tar.gz` → `my env/bundle.tar.gz`).
///
/// # Errors
///
/// `InvalidObjectKey` if a `%` is not followed by two hex digits or the
/// decoded bytes are not UTF-8.
pub fn decode_object_key(raw: &str) -> Result<String> {
    let spaced = raw.replace('+', " ");
    if !escapes_well_formed(&spaced) {
        return Err(TmplverError::InvalidObjectKey(raw.to_string()).into());
    }
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| TmplverError::InvalidObjectKey(raw.to_string()).into())
}

/// `percent_decode_str` passes stray `%` through unchanged; keys must not carry them.
fn escapes_well_formed(key: &str) -> bool {
    key.split('%').skip(1).all(|rest| {
        rest.len() >= 2 && rest.as_bytes()[..2].iter().all(u8::is_ascii_hexdigit)
    })
}
