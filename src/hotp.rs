//! RFC 4226: HOTP(K, C) = Truncate(HMAC(K, C))

use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::{Sha256, Sha512};

use crate::config::check_digits;
use crate::{Algorithm, Error};

type HmacSha1 = Hmac<Sha1>;
type HmacSha256 = Hmac<Sha256>;
type HmacSha512 = Hmac<Sha512>;

/// Compute the HOTP code for `secret` at `counter`
///
/// The counter is hashed as 8 big-endian bytes; the digest is dynamically
/// truncated and reduced to a zero-padded decimal string of `digits` characters.
///
/// # Errors
///
/// Returns [`Error::InvalidParameters`] if `digits` is outside `1..=9`.
pub fn compute(
    secret: &[u8],
    counter: u64,
    digits: u8,
    algorithm: Algorithm,
) -> Result<String, Error> {
    check_digits(digits)?;

    let message = counter.to_be_bytes();
    let truncated = match algorithm {
        Algorithm::Sha1 => compute_with_mac(new_mac::<HmacSha1>(secret)?, &message)?,
        Algorithm::Sha256 => compute_with_mac(new_mac::<HmacSha256>(secret)?, &message)?,
        Algorithm::Sha512 => compute_with_mac(new_mac::<HmacSha512>(secret)?, &message)?,
    };

    format_code(truncated, digits)
}

/// HMAC accepts keys of any length, so this never fails in practice
#[inline]
fn new_mac<M: Mac + KeyInit>(secret: &[u8]) -> Result<M, Error> {
    <M as KeyInit>::new_from_slice(secret)
        .map_err(|e| Error::InvalidParameters(format!("HMAC key rejected: {e}")))
}

/// Generic `update -> finalize` -> `truncate` workflow
#[inline]
fn compute_with_mac<M: Mac>(mut mac: M, message: &[u8]) -> Result<u32, Error> {
    mac.update(message);
    let hmac = mac.finalize().into_bytes();
    truncate(hmac.as_slice())
}

/// RFC 4226: Dynamic truncation
///
/// The low nibble of the last byte selects an offset; the four bytes there
/// are read big-endian with the most significant bit masked off.
///
/// SHA1/SHA256/SHA512 digests are all at least 20 bytes, so the four bytes
/// are always present for real HMAC output.
///
/// # Errors
///
/// Returns [`Error::InvalidParameters`] if `hmac` is empty or too short to
/// hold four bytes at the selected offset.
#[inline]
pub fn truncate(hmac: &[u8]) -> Result<u32, Error> {
    let short = || {
        Error::InvalidParameters(format!(
            "HMAC output of {} bytes is too short to truncate",
            hmac.len()
        ))
    };

    let offset = usize::from(hmac.last().ok_or_else(short)? & 0x0f);
    let bytes: [u8; 4] = hmac
        .get(offset..offset + 4)
        .and_then(|window| window.try_into().ok())
        .ok_or_else(short)?;

    Ok(u32::from_be_bytes(bytes) & 0x7FFF_FFFF)
}

/// Reduce a truncated value to a zero-padded decimal code of `digits` characters
///
/// # Errors
///
/// Returns [`Error::InvalidParameters`] if `digits` is outside `1..=9`.
#[inline]
pub fn format_code(value: u32, digits: u8) -> Result<String, Error> {
    check_digits(digits)?;

    // RFC 4226: Take modulo 10^Digit to generate decimal code
    let code = value % 10u32.pow(digits.into());
    Ok(format!("{code:0width$}", width = usize::from(digits)))
}
