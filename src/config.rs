use crate::{Algorithm, Error};

/// RFC 4226 section 5.3: at least 6 digits
pub const DEFAULT_DIGITS: u8 = 6;
/// RFC 6238 section 5.2: recommended time step of 30 seconds
pub const DEFAULT_STEP: u64 = 30;
/// One step either side of the current one
pub const DEFAULT_SKEW: u8 = 1;
/// Issuer written into enrollment URIs unless overridden
pub const DEFAULT_ISSUER: &str = "2FA App";
/// Account label used when none is supplied
pub const DEFAULT_ACCOUNT: &str = "user@example.com";
/// Largest digit count whose modulus stays meaningful for a 31-bit truncated value
pub const MAX_DIGITS: u8 = 9;

/// TOTP parameters shared by code generation, verification and enrollment
///
/// Defaults match what authenticator apps assume when an enrollment URI omits
/// them: SHA1, 6 digits, 30-second time step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TotpParams {
    /// RFC 6238: X, the time step in seconds
    pub step: u64,
    /// The number of digits composing the auth code. [Datatracker](https://datatracker.ietf.org/doc/html/rfc4226#section-5.3)
    pub digits: u8,
    /// Hash algorithm
    pub algorithm: Algorithm,
    /// Steps accepted on either side of the current one during verification
    pub skew: u8,
    /// Service name shown by authenticator apps
    pub issuer: String,
    /// Account label shown by authenticator apps
    pub account: String,
}

impl Default for TotpParams {
    fn default() -> Self {
        Self {
            step: DEFAULT_STEP,
            digits: DEFAULT_DIGITS,
            algorithm: Algorithm::default(),
            skew: DEFAULT_SKEW,
            issuer: DEFAULT_ISSUER.to_string(),
            account: DEFAULT_ACCOUNT.to_string(),
        }
    }
}

impl TotpParams {
    /// Configure hash algorithm
    #[must_use]
    pub const fn with_algorithm(mut self, algo: Algorithm) -> Self {
        self.algorithm = algo;
        self
    }

    /// Configure the number of verification code digits
    #[must_use]
    pub const fn with_digits(mut self, digits: u8) -> Self {
        self.digits = digits;
        self
    }

    /// Configure time step in seconds
    #[must_use]
    pub const fn with_step(mut self, step: u64) -> Self {
        self.step = step;
        self
    }

    /// Configure the drift window half-width, in steps
    #[must_use]
    pub const fn with_skew(mut self, skew: u8) -> Self {
        self.skew = skew;
        self
    }

    /// Configure the issuer shown by authenticator apps
    #[must_use]
    pub fn with_issuer<S: Into<String>>(mut self, issuer: S) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Configure the account label shown by authenticator apps
    #[must_use]
    pub fn with_account<S: Into<String>>(mut self, account: S) -> Self {
        self.account = account.into();
        self
    }

    /// Reject parameters the engine cannot derive codes from
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameters`] when `step` is zero or `digits` is
    /// outside `1..=9`.
    pub fn check(&self) -> Result<(), Error> {
        if self.step == 0 {
            return Err(Error::InvalidParameters(
                "time step must be greater than zero".into(),
            ));
        }
        check_digits(self.digits)
    }
}

pub(crate) fn check_digits(digits: u8) -> Result<(), Error> {
    if digits == 0 || digits > MAX_DIGITS {
        return Err(Error::InvalidParameters(format!(
            "digit count must be between 1 and {MAX_DIGITS}, got {digits}"
        )));
    }
    Ok(())
}
