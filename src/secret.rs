//! Shared secrets: the key container and the random generator.

use core::fmt;

use rand::TryRngCore;
use rand::rngs::OsRng;
use subtle::ConstantTimeEq;

use crate::{Error, base32};

/// RFC 4226 section 4: keys shorter than 128 bits are discouraged, shorter than 80 bits forbidden
pub const MIN_SECRET_BYTES: usize = 10;
pub const DEFAULT_SECRET_BYTES: usize = 20;

/// Shared secret container
///
/// Key material never appears in `Debug` output. With the `zeroize` feature
/// enabled the bytes are wiped when the key is dropped.
#[cfg_attr(feature = "zeroize", derive(zeroize::Zeroize, zeroize::ZeroizeOnDrop))]
#[derive(Clone)]
pub struct SecretKey(Box<[u8]>);

/// Constant-time in the key contents; only the lengths may differ observably
impl PartialEq for SecretKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for SecretKey {}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey")
            .field("len", &self.0.len())
            .finish_non_exhaustive()
    }
}

impl SecretKey {
    /// Decodes a Base32 encoded shared secret
    ///
    /// Case-insensitive, trailing `=` padding optional. Keys under 80 bits are
    /// accepted, since the caller chose them, but logged as a warning.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEncoding`] if the input contains invalid Base32 characters.
    pub fn from_base32<S: AsRef<str>>(secret: S) -> Result<Self, Error> {
        let decoded = base32::decode(secret)?;

        if decoded.len() < MIN_SECRET_BYTES {
            tracing::warn!(
                bits = decoded.len() * 8,
                "shared secret is below the RFC 4226 minimum of 80 bits"
            );
        }

        Ok(Self(decoded.into_boxed_slice()))
    }

    /// Byte array key
    ///
    /// No length validation is performed; the caller must ensure key security
    pub fn from_bytes<S: AsRef<[u8]>>(secret: S) -> Self {
        Self(secret.as_ref().to_vec().into_boxed_slice())
    }

    /// External form: uppercase Base32 without padding
    #[must_use]
    pub fn to_base32(&self) -> String {
        base32::encode(&self.0)
    }

    /// Reference to the shared secret byte array
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the number of elements in the slice (In bytes)
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the length of 0
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Generate a random shared secret of `byte_length` bytes from the OS CSPRNG
///
/// # Errors
///
/// Returns [`Error::InvalidParameters`] for lengths below 10 bytes and
/// [`Error::EntropyUnavailable`] if the operating system cannot supply random
/// bytes. There is no fallback to a weaker generator.
pub fn generate(byte_length: usize) -> Result<SecretKey, Error> {
    generate_with(&mut OsRng, byte_length)
}

fn generate_with<R: TryRngCore>(rng: &mut R, byte_length: usize) -> Result<SecretKey, Error> {
    if byte_length < MIN_SECRET_BYTES {
        return Err(Error::InvalidParameters(format!(
            "secret must be at least {MIN_SECRET_BYTES} bytes ({} bits), got {byte_length}",
            MIN_SECRET_BYTES * 8
        )));
    }

    let mut secret = vec![0u8; byte_length];
    rng.try_fill_bytes(&mut secret).map_err(|e| {
        tracing::error!(error = %e, "random source failed");
        Error::EntropyUnavailable(e.to_string())
    })?;

    tracing::debug!(bytes = byte_length, "generated shared secret");
    Ok(SecretKey(secret.into_boxed_slice()))
}
