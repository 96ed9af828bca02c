//! `otpauth://` enrollment URIs per the Google Authenticator key URI format:
//! <https://github.com/google/google-authenticator/wiki/Key-Uri-Format>
//!
//! `otpauth://totp/ISSUER:ACCOUNT?secret=BASE32&issuer=ISSUER&digits=6&period=30`

use urlencoding::encode;

use crate::Algorithm;
use crate::config::TotpParams;

/// Build the enrollment URI handed to the QR renderer
///
/// `issuer` and `account` are percent-encoded. The secret is uppercased with
/// any `=` padding removed, since several authenticator apps reject padding.
/// `algorithm` is only written for SHA256/SHA512, as apps assume SHA1.
#[must_use]
pub fn build(issuer: &str, account: &str, secret: &str, params: &TotpParams) -> String {
    let secret = secret.trim_end_matches('=').to_ascii_uppercase();

    let mut uri = if issuer.is_empty() {
        format!("otpauth://totp/{}?secret={secret}", encode(account))
    } else {
        let issuer = encode(issuer);
        format!(
            "otpauth://totp/{issuer}:{}?secret={secret}&issuer={issuer}",
            encode(account)
        )
    };

    uri.push_str(&format!("&digits={}&period={}", params.digits, params.step));
    if params.algorithm != Algorithm::Sha1 {
        uri.push_str(&format!("&algorithm={}", params.algorithm));
    }

    tracing::debug!(account, "built enrollment URI");
    uri
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_parameters() {
        let uri = build(
            "2FA App",
            "alice@example.com",
            "JBSWY3DPEHPK3PXP",
            &TotpParams::default(),
        );
        assert_eq!(
            uri,
            "otpauth://totp/2FA%20App:alice%40example.com?secret=JBSWY3DPEHPK3PXP&issuer=2FA%20App&digits=6&period=30"
        );
    }

    #[test]
    fn labels_are_percent_encoded() {
        let uri = build(
            "My App & Service",
            "test+user@example.com",
            "JBSWY3DPEHPK3PXP",
            &TotpParams::default(),
        );
        assert!(uri.starts_with("otpauth://totp/My%20App%20%26%20Service:test%2Buser%40example.com?"));
        assert!(uri.contains("&issuer=My%20App%20%26%20Service&"));
        assert!(!uri.contains(' '));
    }

    #[test]
    fn secret_is_canonicalised() {
        let uri = build("Acme", "bob", "my======", &TotpParams::default());
        assert!(uri.contains("?secret=MY&"));
    }

    #[test]
    fn empty_issuer_omits_prefix_and_parameter() {
        let uri = build("", "bob", "JBSWY3DPEHPK3PXP", &TotpParams::default());
        assert_eq!(
            uri,
            "otpauth://totp/bob?secret=JBSWY3DPEHPK3PXP&digits=6&period=30"
        );
    }

    #[test]
    fn non_default_parameters_are_written() {
        let params = TotpParams::default()
            .with_digits(8)
            .with_step(60)
            .with_algorithm(Algorithm::Sha256);
        let uri = build("Acme", "bob", "JBSWY3DPEHPK3PXP", &params);
        assert!(uri.ends_with("&digits=8&period=60&algorithm=SHA256"));
    }
}
