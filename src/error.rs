use core::fmt;
use std::io;
use std::time::SystemTimeError;

/// Error type
#[derive(Debug)]
pub enum Error {
    /// A `secret:rest` argument did not split into two non-empty parts
    InvalidFormat(String),
    /// The secret is not valid Base32
    InvalidEncoding,
    /// Step, digit count, timestamp or secret length out of range
    InvalidParameters(String),
    /// The operating system random source could not supply bytes
    EntropyUnavailable(String),
    /// The QR renderer failed to encode or write the image
    RendererFailure(String),
    /// System time is set to before the Unix epoch
    SystemTime(SystemTimeError),
    /// Writing command output failed
    Io(io::Error),
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::SystemTime(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::InvalidFormat(_)
            | Self::InvalidEncoding
            | Self::InvalidParameters(_)
            | Self::EntropyUnavailable(_)
            | Self::RendererFailure(_) => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFormat(usage) => write!(f, "Invalid format. {usage}"),
            Self::InvalidEncoding => write!(
                f,
                "Invalid secret: not valid Base32 (RFC 4648 alphabet A-Z and 2-7)"
            ),
            Self::InvalidParameters(reason) => write!(f, "Invalid parameters: {reason}"),
            Self::EntropyUnavailable(e) => write!(
                f,
                "Secure random source unavailable: {e}. Refusing to generate a weaker secret"
            ),
            Self::RendererFailure(e) => write!(f, "Failed to generate QR code: {e}"),
            Self::SystemTime(e) => write!(
                f,
                "System time error: {e}. The system time is set before the Unix epoch (1970-01-01 00:00:00 UTC)"
            ),
            Self::Io(e) => write!(f, "Failed to write output: {e}"),
        }
    }
}

impl From<SystemTimeError> for Error {
    fn from(e: SystemTimeError) -> Self {
        Self::SystemTime(e)
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
