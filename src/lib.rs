//! RFC 4226 & RFC 6238 one-time-password engine for multi-factor login and
//! transaction confirmation flows
//!
//! - **Secret enrollment**: 32-character Base32 secrets from the OS entropy source
//! - **HOTP**: counter-based 6-digit codes via HMAC-SHA1 dynamic truncation
//! - **TOTP**: 30-second time steps, verified across a ±1 step drift window
//! - **Countdown**: remaining validity of the current step, for UI display
//!
//! The engine is stateless: every operation is a pure function of its inputs
//! (plus the entropy source for enrollment), safe to call concurrently from
//! any number of request handlers. Secret storage, replay bookkeeping and
//! out-of-band delivery belong to the caller.
//!
//! # Examples
//!
//! ```
//! let secret = bankotp::generate_secret().unwrap();
//!
//! let code = bankotp::generate_code(&secret, 1_700_000_000);
//! assert!(bankotp::verify_code(&code, &secret, 1_700_000_000));
//! ```
//!
//! Decoding of supplied secrets is deliberately permissive: characters
//! outside the Base32 alphabet are skipped, not rejected, so secrets pasted
//! with separators or in lowercase still verify. See [`SecretKey::from_base32`].

mod error;
pub use error::Error;

use core::fmt;
use data_encoding::BASE32_NOPAD;
use hmac::{Hmac, Mac};
use rand::{rngs::OsRng, Rng, RngCore};
use sha1::Sha1;
use std::time::{SystemTime, UNIX_EPOCH};

/// RFC 4648 Base32 alphabet (no padding), used for shared secrets
const BASE32_ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Symbol length of a freshly enrolled secret (160 bits of entropy)
pub const SECRET_LENGTH: usize = 32;
/// Decimal digits in every generated code
pub const CODE_DIGITS: u32 = 6;
/// RFC 6238: X, the time step in seconds
pub const TIME_STEP: u64 = 30;
/// Accepted clock drift during verification, in time steps on each side
pub const DRIFT_WINDOW: i64 = 1;

const CODE_SPACE: u32 = 10u32.pow(CODE_DIGITS);

type HmacSha1 = Hmac<Sha1>;

/// Shared secret container
///
/// Holds the raw key bytes decoded from a principal's Base32 secret, with
/// automatic memory zeroing on drop when the `zeroize` feature is enabled.
#[cfg_attr(feature = "zeroize", derive(zeroize::Zeroize, zeroize::ZeroizeOnDrop))]
pub struct SecretKey(Box<[u8]>);

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
    /// Decoding is case-insensitive and never fails: characters outside the
    /// RFC 4648 alphabet (separators, whitespace, stray punctuation) are
    /// skipped rather than rejected, and trailing bits short of a full byte
    /// are discarded. An all-garbage input yields an empty key; whether that
    /// key is usable is decided at HMAC time, not here.
    pub fn from_base32<S: AsRef<str>>(secret: S) -> Self {
        let input = secret.as_ref();

        let mut decoded = Vec::with_capacity(input.len() * 5 / 8);
        let mut acc: u32 = 0;
        let mut bits: u32 = 0;

        for ch in input.bytes() {
            let ch = ch.to_ascii_uppercase();
            let Some(value) = BASE32_ALPHABET.iter().position(|&a| a == ch) else {
                continue;
            };

            acc = (acc << 5) | value as u32;
            bits += 5;

            if bits >= 8 {
                bits -= 8;
                decoded.push((acc >> bits) as u8);
            }
        }

        Self(decoded.into_boxed_slice())
    }

    /// Reference to the decoded key byte array
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Decoded key length in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if nothing decodable was found in the secret
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Generates a new shared secret for enrollment
///
/// Draws 160 bits from the OS entropy source and Base32-encodes them to
/// exactly [`SECRET_LENGTH`] symbols. Generated once per principal;
/// rotation means calling this again and replacing the stored value.
///
/// # Errors
///
/// Returns [`Error::Entropy`] when the OS randomness source is unavailable.
/// A degraded secret is never substituted; the caller must surface the
/// failure and retry enrollment.
pub fn generate_secret() -> Result<String, Error> {
    let mut raw = [0u8; SECRET_LENGTH * 5 / 8];
    OsRng.try_fill_bytes(&mut raw).map_err(Error::Entropy)?;

    Ok(BASE32_NOPAD.encode(&raw))
}

/// Generates the code for the time step containing `unix_time`
///
/// RFC 6238: TOTP = HOTP(K, T) where T = unix_time / [`TIME_STEP`].
///
/// Never hard-fails: if the secret cannot be turned into an HMAC key the
/// call degrades to a uniformly random 6-digit code so the login path stays
/// available. Such a code is not derived from the secret and will not
/// verify against it.
pub fn generate_code(secret: &str, unix_time: u64) -> String {
    generate_code_at_counter(secret, counter_at(unix_time))
        .unwrap_or_else(|_| random_fallback_code())
}

/// Generates the HOTP code for an explicit counter value
///
/// RFC 4226: HOTP(K, C) = Truncate(HMAC-SHA-1(K, C)), reduced to
/// [`CODE_DIGITS`] decimal digits. Deterministic: the same (secret, counter)
/// pair always yields the same code.
///
/// # Errors
///
/// Returns [`Error::Decode`] when the decoded secret is rejected as an HMAC
/// key.
pub fn generate_code_at_counter(secret: &str, counter: u64) -> Result<String, Error> {
    hotp(&SecretKey::from_base32(secret), counter)
}

/// Checks a submitted code against the drift window around `unix_time`
///
/// Candidate codes are recomputed for the current step and [`DRIFT_WINDOW`]
/// steps on each side, tolerating clock skew and network delay of one step.
/// Returns `true` on the first match; `false` when nothing matches or the
/// secret is unusable. Verification fails closed: no internal error is ever
/// reported as a valid code.
///
/// Each candidate comparison runs without data-dependent early exit.
pub fn verify_code(submitted: &str, secret: &str, unix_time: u64) -> bool {
    let key = SecretKey::from_base32(secret);
    let current = counter_at(unix_time);

    for step in -DRIFT_WINDOW..=DRIFT_WINDOW {
        // Steps before counter 0 do not exist; skip rather than wrap.
        let Some(counter) = current.checked_add_signed(step) else {
            continue;
        };

        match hotp(&key, counter) {
            Ok(expected) => {
                if constant_time_eq(submitted.as_bytes(), expected.as_bytes()) {
                    return true;
                }
            }
            Err(_) => return false,
        }
    }

    false
}

/// Seconds left in the time step containing `unix_time`
///
/// Always in `1..=TIME_STEP`, wrapping back to [`TIME_STEP`] exactly on step
/// boundaries. Intended for countdown display; not a security control.
#[must_use]
#[inline]
pub const fn remaining_seconds(unix_time: u64) -> u64 {
    TIME_STEP - (unix_time % TIME_STEP)
}

/// RFC 6238: T = unix_time / X
///
/// Calculate the counter value corresponding to the timestamp
#[must_use]
#[inline]
pub const fn counter_at(unix_time: u64) -> u64 {
    unix_time / TIME_STEP
}

/// Generates the code for the current system time
///
/// Same degradation policy as [`generate_code`]: a clock set before the Unix
/// epoch counts as an internal failure and yields a random fallback code.
pub fn generate_code_now(secret: &str) -> String {
    match system_time() {
        Ok(now) => generate_code(secret, now),
        Err(_) => random_fallback_code(),
    }
}

/// Verifies a submitted code against the current system time
///
/// A clock set before the Unix epoch fails closed.
pub fn verify_code_now(submitted: &str, secret: &str) -> bool {
    system_time()
        .map(|now| verify_code(submitted, secret, now))
        .unwrap_or(false)
}

/// Remaining validity of the current code, for countdown display
///
/// # Errors
///
/// Returns an error when system time is set before the Unix epoch.
pub fn remaining_seconds_now() -> Result<u64, Error> {
    Ok(remaining_seconds(system_time()?))
}

fn hotp(key: &SecretKey, counter: u64) -> Result<String, Error> {
    let mut mac = HmacSha1::new_from_slice(key.as_bytes()).map_err(|_| Error::Decode)?;
    mac.update(&counter.to_be_bytes());
    let digest = mac.finalize().into_bytes();

    Ok(format_code(dynamic_truncation(&digest)))
}

/// RFC 4226 dynamic truncation
///
/// Extract the 4 bytes at `digest[last & 0x0f]`, mask the top bit, read as a
/// 31-bit big-endian integer. SHA1 digests are 20 bytes, so the 4-byte read
/// always fits.
#[inline]
fn dynamic_truncation(digest: &[u8]) -> u32 {
    let offset = (digest[digest.len() - 1] & 0x0f) as usize;

    u32::from_be_bytes([
        digest[offset] & 0x7f,
        digest[offset + 1],
        digest[offset + 2],
        digest[offset + 3],
    ])
}

/// RFC 4226: reduce modulo 10^Digit, left-pad with zeros to a fixed width
#[inline]
fn format_code(value: u32) -> String {
    format!("{:0width$}", value % CODE_SPACE, width = CODE_DIGITS as usize)
}

/// Availability fallback: a uniform 6-digit code not derived from any secret
fn random_fallback_code() -> String {
    format_code(rand::thread_rng().gen_range(0..CODE_SPACE))
}

/// Byte-wise equality without data-dependent early exit
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Get the current system time as a Unix timestamp
#[inline]
fn system_time() -> Result<u64, Error> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(Error::SystemTime)
}
