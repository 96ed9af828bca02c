//! RFC 4226 & RFC 6238 one-time passwords for two-factor enrollment
//!
//! - **Secrets**: Cryptographically random keys, exchanged as RFC 4648 Base32
//! - **HOTP / TOTP**: SHA1, SHA256 and SHA512, 1-9 digit codes, any time step
//! - **Verification**: Constant-time comparison over a configurable drift window
//! - **Enrollment**: `otpauth://` URIs rendered to scannable PNG QR codes
//!
//! # Examples
//!
//! ```
//! use twofa::{Algorithm, Totp, TotpParams};
//!
//! let params = TotpParams::default()
//!     .with_algorithm(Algorithm::Sha1)
//!     .with_digits(8)
//!     .with_step(30);
//! let totp = Totp::new("GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ", params).unwrap();
//!
//! assert_eq!(totp.generate_at(59).unwrap(), "94287082");
//! assert!(totp.verify_at("94287082", 59).unwrap());
//! assert!(!totp.verify_at("94287082", 3600).unwrap());
//! ```
//!
//! Enrolling a fresh secret:
//!
//! ```
//! use twofa::{TotpParams, secret, uri};
//!
//! let key = secret::generate(secret::DEFAULT_SECRET_BYTES).unwrap();
//! let link = uri::build("2FA App", "alice@example.com", &key.to_base32(), &TotpParams::default());
//! assert!(link.starts_with("otpauth://totp/2FA%20App:alice%40example.com?secret="));
//! ```

pub mod base32;
pub mod cli;
mod config;
mod error;
pub mod hotp;
pub mod qr;
pub mod secret;
pub mod totp;
pub mod uri;

pub use config::{
    DEFAULT_ACCOUNT, DEFAULT_DIGITS, DEFAULT_ISSUER, DEFAULT_SKEW, DEFAULT_STEP, MAX_DIGITS,
    TotpParams,
};
pub use error::Error;
pub use secret::SecretKey;
pub use totp::Totp;

use core::fmt;

/// Hash algorithms supported by OTP
///
/// RFC 4226 requires HMAC-SHA-1, RFC 6238 extends support for HMAC-SHA-256 and HMAC-SHA-512
///
/// Use SHA1 by default to ensure maximum compatibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Algorithm {
    /// HMAC-SHA-1 is the default algorithm for most OTP implementations
    #[default]
    Sha1,
    /// HMAC-SHA-256. Supported in theory according to [Datatracker](https://datatracker.ietf.org/doc/html/rfc6238#section-1.2)
    Sha256,
    /// HMAC-SHA-512
    Sha512,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sha1 => write!(f, "SHA1"),
            Self::Sha256 => write!(f, "SHA256"),
            Self::Sha512 => write!(f, "SHA512"),
        }
    }
}
