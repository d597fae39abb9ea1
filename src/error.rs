use core::fmt;
use std::time::SystemTimeError;

/// Error type
#[derive(Debug)]
pub enum Error {
    /// The OS randomness source failed during secret generation
    Entropy(rand::Error),
    /// The shared secret could not be turned into a usable HMAC key
    Decode,
    /// System time is set to before the Unix epoch
    SystemTime(SystemTimeError),
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Entropy(e) => Some(e),
            Self::SystemTime(e) => Some(e),
            Self::Decode => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entropy(e) => write!(
                f,
                "Secure randomness unavailable: {e}. Secret enrollment failed and must be retried"
            ),
            Self::Decode => write!(f, "Shared secret could not be decoded into an HMAC key"),
            Self::SystemTime(e) => write!(
                f,
                "System time error: {e}. The system time is set before the Unix epoch (1970-01-01 00:00:00 UTC)"
            ),
        }
    }
}

impl From<SystemTimeError> for Error {
    fn from(e: SystemTimeError) -> Self {
        Self::SystemTime(e)
    }
}
