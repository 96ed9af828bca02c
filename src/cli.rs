//! Command-line surface: argument definitions and the three modes.
//!
//! Usage:
//!   twofa --generate
//!   twofa --qr JBSWY3DPEHPK3PXP:alice@example.com
//!   twofa --verify JBSWY3DPEHPK3PXP:123456

use std::io::Write;
use std::path::PathBuf;

use clap::{ArgAction, ArgGroup, Parser, ValueEnum};

use crate::qr::{self, DEFAULT_SIZE, QrRenderer};
use crate::secret::{self, DEFAULT_SECRET_BYTES};
use crate::{
    Algorithm, DEFAULT_DIGITS, DEFAULT_ISSUER, DEFAULT_SKEW, DEFAULT_STEP, Error, TotpParams,
    base32, totp, uri,
};

#[derive(Parser, Debug)]
#[command(name = "twofa")]
#[command(version)]
#[command(about = "Simple 2FA TOTP tool: generate secrets, enrollment QR codes and verify codes", long_about = None)]
#[command(group(ArgGroup::new("mode").args(["generate", "qr", "verify"]).multiple(false)))]
pub struct Cli {
    /// Generate a new TOTP secret
    #[arg(long)]
    pub generate: bool,

    /// Generate a QR code PNG for enrollment
    #[arg(long, value_name = "SECRET:ACCOUNT")]
    pub qr: Option<String>,

    /// Verify a TOTP code against the current time
    #[arg(long, value_name = "SECRET:CODE")]
    pub verify: Option<String>,

    /// Issuer shown by authenticator apps
    #[arg(long, default_value = DEFAULT_ISSUER)]
    pub issuer: String,

    /// Number of digits in a code
    #[arg(long, default_value_t = DEFAULT_DIGITS)]
    pub digits: u8,

    /// Time step in seconds
    #[arg(long, default_value_t = DEFAULT_STEP)]
    pub period: u64,

    /// HMAC hash algorithm
    #[arg(long, value_enum, default_value_t = AlgorithmArg::Sha1)]
    pub algorithm: AlgorithmArg,

    /// Steps accepted on either side of the current one when verifying
    #[arg(long, default_value_t = DEFAULT_SKEW)]
    pub skew: u8,

    /// Secret length in bytes for --generate
    #[arg(long, default_value_t = DEFAULT_SECRET_BYTES)]
    pub bytes: usize,

    /// Directory the QR code PNG is written to
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Edge length of the QR code PNG in pixels
    #[arg(long, default_value_t = DEFAULT_SIZE)]
    pub size: u32,

    /// Use this Unix timestamp instead of the system clock
    #[arg(long, value_name = "UNIX_SECONDS", allow_negative_numbers = true)]
    pub at: Option<i64>,

    /// Log more detail to stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlgorithmArg {
    Sha1,
    Sha256,
    Sha512,
}

impl From<AlgorithmArg> for Algorithm {
    fn from(arg: AlgorithmArg) -> Self {
        match arg {
            AlgorithmArg::Sha1 => Self::Sha1,
            AlgorithmArg::Sha256 => Self::Sha256,
            AlgorithmArg::Sha512 => Self::Sha512,
        }
    }
}

/// The selected operation with its `secret:rest` argument already split
#[derive(Debug, PartialEq, Eq)]
pub enum Mode<'a> {
    Generate,
    Qr { secret: &'a str, account: &'a str },
    Verify { secret: &'a str, code: &'a str },
    Help,
}

impl Cli {
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] if a `--qr`/`--verify` argument is not
    /// `secret:rest` with both parts non-empty.
    pub fn mode(&self) -> Result<Mode<'_>, Error> {
        if self.generate {
            return Ok(Mode::Generate);
        }
        if let Some(arg) = &self.qr {
            let (secret, account) = split_pair(arg, "Use --qr secret:account_name")?;
            return Ok(Mode::Qr { secret, account });
        }
        if let Some(arg) = &self.verify {
            let (secret, code) = split_pair(arg, "Use --verify secret:123456")?;
            return Ok(Mode::Verify { secret, code });
        }
        Ok(Mode::Help)
    }

    #[must_use]
    pub fn params(&self) -> TotpParams {
        TotpParams::default()
            .with_issuer(self.issuer.clone())
            .with_digits(self.digits)
            .with_step(self.period)
            .with_algorithm(self.algorithm.into())
            .with_skew(self.skew)
    }

    fn now(&self) -> Result<i64, Error> {
        match self.at {
            Some(at) => Ok(at),
            None => totp::unix_now(),
        }
    }
}

/// Split `input` on the first colon into two non-empty parts
///
/// # Errors
///
/// Returns [`Error::InvalidFormat`] carrying `usage` otherwise.
pub fn split_pair<'a>(input: &'a str, usage: &str) -> Result<(&'a str, &'a str), Error> {
    match input.split_once(':') {
        Some((head, rest)) if !head.is_empty() && !rest.is_empty() => Ok((head, rest)),
        _ => Err(Error::InvalidFormat(usage.to_string())),
    }
}

/// Execute the selected mode, writing user-facing output to `out`
///
/// # Errors
///
/// Every error is fatal for the invocation: malformed arguments, a secret that
/// is not Base32, invalid parameters, an unavailable random source or a QR
/// write failure. An INVALID verification result is not an error.
pub fn run<W: Write>(cli: &Cli, out: &mut W, renderer: &dyn QrRenderer) -> Result<(), Error> {
    match cli.mode()? {
        Mode::Generate => generate(cli, out),
        Mode::Qr { secret, account } => enroll(cli, secret, account, out, renderer),
        Mode::Verify { secret, code } => verify(cli, secret, code, out),
        Mode::Help => print_help(out),
    }
}

fn generate<W: Write>(cli: &Cli, out: &mut W) -> Result<(), Error> {
    let params = cli.params();
    params.check()?;

    let key = secret::generate(cli.bytes)?;
    let text = key.to_base32();
    let sample = totp::current_code(key.as_bytes(), &params, cli.now()?)?;

    writeln!(out, " Secret: {text}")?;
    writeln!(out, " Add to Google Authenticator")?;
    writeln!(out)?;
    writeln!(out, "Quick test:")?;
    writeln!(out, "  twofa --verify {text}:{sample}{}", non_default_flags(&params))?;
    Ok(())
}

fn enroll<W: Write>(
    cli: &Cli,
    secret: &str,
    account: &str,
    out: &mut W,
    renderer: &dyn QrRenderer,
) -> Result<(), Error> {
    let params = cli.params().with_account(account);
    params.check()?;

    let secret = base32::normalize(secret)?;
    let link = uri::build(&params.issuer, &params.account, &secret, &params);
    let path = cli.out_dir.join(qr::file_name(account));

    renderer.render(&link, &path)?;

    writeln!(out, " QR code saved as {}", path.display())?;
    writeln!(out, " Scan it with Google Authenticator")?;
    Ok(())
}

fn verify<W: Write>(cli: &Cli, secret: &str, code: &str, out: &mut W) -> Result<(), Error> {
    let params = cli.params();
    let valid = totp::validate_base32(code, secret, &params, cli.now()?)?;

    if valid {
        tracing::info!("code accepted");
        writeln!(out, "✅ Code {code} is VALID")?;
    } else {
        tracing::info!("code rejected");
        writeln!(out, "❌ Code {code} is INVALID")?;
    }
    Ok(())
}

fn print_help<W: Write>(out: &mut W) -> Result<(), Error> {
    writeln!(out, " Simple 2FA TOTP Tool")?;
    writeln!(out, "\nUsage:")?;
    writeln!(out, "  Generate new secret:")?;
    writeln!(out, "    twofa --generate")?;
    writeln!(out, "\n  Generate QR code:")?;
    writeln!(out, "    twofa --qr JBSWY3DPEHPK3PXP:alice@example.com")?;
    writeln!(out, "\n  Verify code:")?;
    writeln!(out, "    twofa --verify JBSWY3DPEHPK3PXP:123456")?;
    writeln!(out, "\nRun with --help for all options.")?;
    Ok(())
}

/// Flags a verify invocation needs to reproduce `params`
fn non_default_flags(params: &TotpParams) -> String {
    let mut flags = String::new();
    if params.digits != DEFAULT_DIGITS {
        flags.push_str(&format!(" --digits {}", params.digits));
    }
    if params.step != DEFAULT_STEP {
        flags.push_str(&format!(" --period {}", params.step));
    }
    if params.algorithm != Algorithm::Sha1 {
        flags.push_str(&format!(
            " --algorithm {}",
            params.algorithm.to_string().to_lowercase()
        ));
    }
    flags
}
