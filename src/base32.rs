//! RFC 4648 Base32, the human-typed form of a shared secret.
//!
//! Output is always uppercase without `=` padding. Input is accepted in any
//! case, with or without trailing padding.

use data_encoding::{BASE32_NOPAD, BASE32_NOPAD_NOCASE};

use crate::Error;

/// Encode raw secret bytes as uppercase, unpadded Base32
#[must_use]
pub fn encode(bytes: &[u8]) -> String {
    BASE32_NOPAD.encode(bytes)
}

/// Decode Base32 text into raw bytes
///
/// # Errors
///
/// Returns [`Error::InvalidEncoding`] if the input contains characters outside
/// the RFC 4648 alphabet or has a length no byte sequence encodes to.
pub fn decode<S: AsRef<str>>(text: S) -> Result<Vec<u8>, Error> {
    let input = text.as_ref().trim_end_matches('=');

    BASE32_NOPAD_NOCASE
        .decode(input.as_bytes())
        .map_err(|_| Error::InvalidEncoding)
}

/// Canonical form of user-typed Base32: uppercase, padding stripped
///
/// # Errors
///
/// Returns [`Error::InvalidEncoding`] if the input does not decode.
pub fn normalize<S: AsRef<str>>(text: S) -> Result<String, Error> {
    decode(text).map(|bytes| encode(&bytes))
}
