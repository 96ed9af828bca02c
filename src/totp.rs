//! RFC 6238: Time-Based One-Time Password
//!
//! TOTP = HOTP(K, T) where T = (Current Unix time - T0) / X, with T0 = 0.
//! Verification accepts a window of `skew` steps on either side of T to absorb
//! clock drift between the authenticator and this host.

use std::time::{SystemTime, UNIX_EPOCH};

use subtle::{Choice, ConstantTimeEq};

use crate::config::TotpParams;
use crate::secret::SecretKey;
use crate::{Error, base32, hotp};

/// RFC 6238: T = (Current Unix time - T0) / X
///
/// # Errors
///
/// Returns [`Error::InvalidParameters`] if `now` is negative or `step` is zero.
pub fn counter_at(now: i64, step: u64) -> Result<u64, Error> {
    if step == 0 {
        return Err(Error::InvalidParameters(
            "time step must be greater than zero".into(),
        ));
    }
    let now = u64::try_from(now).map_err(|_| {
        Error::InvalidParameters(format!("timestamp must not be negative, got {now}"))
    })?;
    Ok(now / step)
}

/// The code an authenticator shows at `now`
///
/// # Errors
///
/// Returns [`Error::InvalidParameters`] for a zero step, an out-of-range digit
/// count or a negative timestamp.
pub fn current_code(secret: &[u8], params: &TotpParams, now: i64) -> Result<String, Error> {
    params.check()?;
    let counter = counter_at(now, params.step)?;
    tracing::debug!(counter, algorithm = %params.algorithm, "computing TOTP code");
    hotp::compute(secret, counter, params.digits, params.algorithm)
}

/// Check a submitted code against the drift window around `now`
///
/// Every counter in `T - skew ..= T + skew` is evaluated and compared in
/// constant time, so neither a partial match nor the matching step shows up in
/// the timing. A wrong code is `Ok(false)`. Codes of the wrong length or
/// containing non-digits are rejected before any HMAC is computed.
///
/// # Errors
///
/// Returns [`Error::InvalidParameters`] for a zero step, an out-of-range digit
/// count or a negative timestamp.
pub fn validate(
    code: &str,
    secret: &[u8],
    params: &TotpParams,
    now: i64,
) -> Result<bool, Error> {
    validate_with(code, params, now, |counter| {
        hotp::compute(secret, counter, params.digits, params.algorithm)
    })
}

/// [`validate`] for a secret still in its Base32 text form
///
/// # Errors
///
/// Returns [`Error::InvalidEncoding`] if `secret` is not valid Base32, kept
/// distinct from a wrong code, plus everything [`validate`] returns.
pub fn validate_base32(
    code: &str,
    secret: &str,
    params: &TotpParams,
    now: i64,
) -> Result<bool, Error> {
    let key = base32::decode(secret)?;
    validate(code, &key, params, now)
}

/// Seconds until the code shown at `now` rolls over
///
/// # Errors
///
/// Returns [`Error::InvalidParameters`] if `now` is negative or the step is zero.
pub fn seconds_remaining(params: &TotpParams, now: i64) -> Result<u64, Error> {
    counter_at(now, params.step)?;
    let now = now.unsigned_abs();
    Ok(params.step - (now % params.step))
}

/// Get the current system time as Unix timestamp
///
/// # Errors
///
/// Returns an error when system time is earlier than Unix epoch (1970-01-01 00:00:00 UTC).
pub fn unix_now() -> Result<i64, Error> {
    let secs = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
    i64::try_from(secs)
        .map_err(|_| Error::InvalidParameters(format!("system time {secs} out of range")))
}

fn validate_with<F>(
    code: &str,
    params: &TotpParams,
    now: i64,
    mut hotp_at: F,
) -> Result<bool, Error>
where
    F: FnMut(u64) -> Result<String, Error>,
{
    params.check()?;
    let counter = counter_at(now, params.step)?;

    if code.len() != usize::from(params.digits) || !code.bytes().all(|b| b.is_ascii_digit()) {
        tracing::debug!(
            expected_digits = params.digits,
            submitted_len = code.len(),
            "rejecting malformed code"
        );
        return Ok(false);
    }

    let skew = u64::from(params.skew);
    let first = counter.saturating_sub(skew);
    let last = counter.saturating_add(skew);

    let mut matched = Choice::from(0u8);
    for candidate in first..=last {
        let expected = hotp_at(candidate)?;
        matched |= code.as_bytes().ct_eq(expected.as_bytes());
    }

    let valid = bool::from(matched);
    tracing::debug!(counter, skew, valid, "verified TOTP code");
    Ok(valid)
}

/// A decoded shared secret bundled with its TOTP parameters
#[derive(Debug)]
pub struct Totp {
    secret: SecretKey,
    params: TotpParams,
}

impl Totp {
    /// Create a TOTP instance from a Base32 encoded shared secret
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The input contains invalid Base32 characters
    /// - `params` has a zero step or an out-of-range digit count
    pub fn new<S: AsRef<str>>(secret: S, params: TotpParams) -> Result<Self, Error> {
        Self::from_secret(SecretKey::from_base32(secret)?, params)
    }

    /// Create a TOTP instance from an already decoded secret
    ///
    /// # Errors
    ///
    /// Returns an error if `params` has a zero step or an out-of-range digit count.
    pub fn from_secret(secret: SecretKey, params: TotpParams) -> Result<Self, Error> {
        params.check()?;
        Ok(Self { secret, params })
    }

    #[must_use]
    pub const fn params(&self) -> &TotpParams {
        &self.params
    }

    #[must_use]
    pub const fn secret(&self) -> &SecretKey {
        &self.secret
    }

    /// Code for an explicit Unix timestamp
    ///
    /// # Errors
    ///
    /// Returns an error if `now` is negative.
    pub fn generate_at(&self, now: i64) -> Result<String, Error> {
        current_code(self.secret.as_bytes(), &self.params, now)
    }

    /// Generate current verification code
    ///
    /// # Errors
    ///
    /// Returns an error when system time retrieval fails
    pub fn generate(&self) -> Result<String, Error> {
        self.generate_at(unix_now()?)
    }

    /// Verify `code` at an explicit Unix timestamp
    ///
    /// # Errors
    ///
    /// Returns an error if `now` is negative; a wrong code is `Ok(false)`.
    pub fn verify_at(&self, code: &str, now: i64) -> Result<bool, Error> {
        validate(code, self.secret.as_bytes(), &self.params, now)
    }

    /// Verify `code` against the current system time
    ///
    /// # Errors
    ///
    /// Returns an error when system time retrieval fails
    pub fn verify(&self, code: &str) -> Result<bool, Error> {
        self.verify_at(code, unix_now()?)
    }

    /// Get the remaining valid time (TTL) for the current verification code
    ///
    /// # Errors
    ///
    /// Returns an error when system time retrieval fails.
    pub fn ttl(&self) -> Result<u64, Error> {
        seconds_remaining(&self.params, unix_now()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Algorithm;

    const RFC_SECRET: &[u8] = b"12345678901234567890";
    const RFC_SECRET_B32: &str = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";

    // RFC 4226 Appendix D, HMAC-SHA-1, 6 digits, counters 0..=9
    const HOTP_CODES: [&str; 10] = [
        "755224", "287082", "359152", "969429", "338314", "254676", "287922", "162583", "399871",
        "520489",
    ];

    fn rfc6238_params() -> TotpParams {
        TotpParams::default().with_digits(8)
    }

    #[test]
    fn counter_is_floor_of_time_over_step() {
        assert_eq!(counter_at(0, 30).unwrap(), 0);
        assert_eq!(counter_at(29, 30).unwrap(), 0);
        assert_eq!(counter_at(59, 30).unwrap(), 1);
        assert_eq!(counter_at(60, 30).unwrap(), 2);
        assert_eq!(counter_at(1_111_111_109, 30).unwrap(), 0x023523EC);
    }

    #[test]
    fn counter_rejects_negative_time_and_zero_step() {
        assert!(matches!(counter_at(-1, 30), Err(Error::InvalidParameters(_))));
        assert!(matches!(counter_at(59, 0), Err(Error::InvalidParameters(_))));
    }

    #[test]
    fn rfc6238_sha1_vectors() {
        let params = rfc6238_params();
        let vectors = [
            (59, "94287082"),
            (1_111_111_109, "07081804"),
            (1_111_111_111, "14050471"),
            (1_234_567_890, "89005924"),
            (2_000_000_000, "69279037"),
            (20_000_000_000, "65353130"),
        ];
        for (time, code) in vectors {
            assert_eq!(current_code(RFC_SECRET, &params, time).unwrap(), code, "t={time}");
        }
    }

    #[test]
    fn rfc6238_sha256_and_sha512_at_59() {
        let sha256 = rfc6238_params().with_algorithm(Algorithm::Sha256);
        let sha512 = rfc6238_params().with_algorithm(Algorithm::Sha512);
        assert_eq!(
            current_code(b"12345678901234567890123456789012", &sha256, 59).unwrap(),
            "46119246"
        );
        assert_eq!(
            current_code(
                b"1234567890123456789012345678901234567890123456789012345678901234",
                &sha512,
                59
            )
            .unwrap(),
            "90693936"
        );
    }

    #[test]
    fn validates_code_for_current_step() {
        let params = rfc6238_params();
        assert!(validate("94287082", RFC_SECRET, &params, 59).unwrap());
        assert!(!validate("94287083", RFC_SECRET, &params, 59).unwrap());
    }

    #[test]
    fn drift_window_accepts_adjacent_steps_only() {
        let params = TotpParams::default();
        // now = 165 -> counter 5, window 4..=6
        let now = 165;
        assert!(validate(HOTP_CODES[5], RFC_SECRET, &params, now).unwrap());
        assert!(validate(HOTP_CODES[4], RFC_SECRET, &params, now).unwrap());
        assert!(validate(HOTP_CODES[6], RFC_SECRET, &params, now).unwrap());
        assert!(!validate(HOTP_CODES[3], RFC_SECRET, &params, now).unwrap());
        assert!(!validate(HOTP_CODES[7], RFC_SECRET, &params, now).unwrap());
    }

    #[test]
    fn code_from_previous_step_is_valid_but_not_two_steps_back() {
        let params = TotpParams::default();
        let now = 165;
        let one_back = current_code(RFC_SECRET, &params, now - 30).unwrap();
        let two_back = current_code(RFC_SECRET, &params, now - 60).unwrap();
        assert_eq!(one_back, HOTP_CODES[4]);
        assert_eq!(two_back, HOTP_CODES[3]);
        // counter 3's code does not recur inside the window 4..=6
        assert!(!HOTP_CODES[4..=6].contains(&two_back.as_str()));

        assert!(validate(&one_back, RFC_SECRET, &params, now).unwrap());
        assert!(!validate(&two_back, RFC_SECRET, &params, now).unwrap());
    }

    #[test]
    fn skew_is_configurable() {
        let now = 165;
        let exact = TotpParams::default().with_skew(0);
        assert!(validate(HOTP_CODES[5], RFC_SECRET, &exact, now).unwrap());
        assert!(!validate(HOTP_CODES[4], RFC_SECRET, &exact, now).unwrap());

        let wide = TotpParams::default().with_skew(2);
        assert!(validate(HOTP_CODES[3], RFC_SECRET, &wide, now).unwrap());
        assert!(validate(HOTP_CODES[7], RFC_SECRET, &wide, now).unwrap());
        assert!(!validate(HOTP_CODES[2], RFC_SECRET, &wide, now).unwrap());
    }

    #[test]
    fn window_does_not_underflow_at_epoch() {
        let params = TotpParams::default();
        assert!(validate(HOTP_CODES[0], RFC_SECRET, &params, 0).unwrap());
        assert!(validate(HOTP_CODES[1], RFC_SECRET, &params, 0).unwrap());
        assert!(!validate(HOTP_CODES[2], RFC_SECRET, &params, 0).unwrap());
    }

    #[test]
    fn malformed_codes_skip_hmac() {
        let params = TotpParams::default();
        for code in ["12345", "1234567", "", "12a456", "１２３４５６"] {
            let mut calls = 0;
            let valid = validate_with(code, &params, 59, |_| {
                calls += 1;
                Ok(String::new())
            })
            .unwrap();
            assert!(!valid, "{code:?}");
            assert_eq!(calls, 0, "{code:?} should not reach HMAC");
        }
    }

    #[test]
    fn well_formed_code_evaluates_whole_window() {
        let params = TotpParams::default().with_skew(2);
        let mut seen = Vec::new();
        let valid = validate_with("000000", &params, 165, |counter| {
            seen.push(counter);
            Ok("000000".to_string())
        })
        .unwrap();
        assert!(valid);
        assert_eq!(seen, vec![3, 4, 5, 6, 7]);
    }

    #[test]
    fn malformed_secret_is_an_encoding_error() {
        let params = TotpParams::default();
        assert!(matches!(
            validate_base32("123456", "not-base32!!", &params, 59),
            Err(Error::InvalidEncoding)
        ));
        assert!(validate_base32("94287082", RFC_SECRET_B32, &rfc6238_params(), 59).unwrap());
    }

    #[test]
    fn invalid_parameters_are_errors_not_false() {
        let zero_step = TotpParams::default().with_step(0);
        assert!(matches!(
            validate("123456", RFC_SECRET, &zero_step, 59),
            Err(Error::InvalidParameters(_))
        ));
        assert!(matches!(
            validate("123456", RFC_SECRET, &TotpParams::default(), -5),
            Err(Error::InvalidParameters(_))
        ));
        assert!(matches!(
            current_code(RFC_SECRET, &TotpParams::default().with_digits(0), 59),
            Err(Error::InvalidParameters(_))
        ));
    }

    #[test]
    fn seconds_remaining_counts_down_within_step() {
        let params = TotpParams::default();
        assert_eq!(seconds_remaining(&params, 0).unwrap(), 30);
        assert_eq!(seconds_remaining(&params, 59).unwrap(), 1);
        assert_eq!(seconds_remaining(&params, 61).unwrap(), 29);
    }

    #[test]
    fn totp_value_generates_and_verifies() {
        let totp = Totp::new(RFC_SECRET_B32, rfc6238_params()).unwrap();
        assert_eq!(totp.secret().as_bytes(), RFC_SECRET);
        assert_eq!(totp.params().digits, 8);
        assert_eq!(totp.generate_at(59).unwrap(), "94287082");
        assert!(totp.verify_at("94287082", 59).unwrap());
        assert!(!totp.verify_at("94287082", 3600).unwrap());

        let live = totp.generate().unwrap();
        assert!(totp.verify(&live).unwrap());
        assert!((1..=30).contains(&totp.ttl().unwrap()));
    }

    #[test]
    fn totp_value_rejects_bad_inputs() {
        assert!(matches!(
            Totp::new("not-base32!!", TotpParams::default()),
            Err(Error::InvalidEncoding)
        ));
        assert!(matches!(
            Totp::new(RFC_SECRET_B32, TotpParams::default().with_step(0)),
            Err(Error::InvalidParameters(_))
        ));
    }
}
