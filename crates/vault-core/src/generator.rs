//! Secure random password generation
//!
//! Candidates are drawn from a weighted alphabet using the OS random
//! source, then screened against the breach corpus before they are handed
//! out. Breached candidates are zeroed and redrawn.

use rand::{rngs::OsRng, Rng};
use tracing::debug;

use crate::breach::{BreachCheck, BreachVerdict, HibpChecker};
use crate::crypto::SecretString;
use crate::error::{Result, VaultError};

/// Minimum generated password length, inclusive
pub const MIN_LEN: usize = 10;

/// Maximum generated password length, inclusive
pub const MAX_LEN: usize = 20;

/// Weighted draw set: every letter once, every digit three times, the
/// eleven punctuation characters twice. Positions are drawn uniformly from
/// this set, so the repeats raise the rate of digits and punctuation in
/// the result.
const DRAW_SET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ012345678901234567890123456789?+=!&/-_<>|?+=!&/-_<>|";

/// Password generator with breach screening
pub struct PasswordGenerator {
    checker: Box<dyn BreachCheck>,
}

impl PasswordGenerator {
    /// Create a generator screening against the public breach corpus
    pub fn new() -> Self {
        Self::with_checker(Box::new(HibpChecker::new()))
    }

    /// Create a generator with an explicit screening backend
    pub fn with_checker(checker: Box<dyn BreachCheck>) -> Self {
        Self { checker }
    }

    /// Generate a password that is absent from the breach corpus
    ///
    /// Breached candidates are zeroed and redrawn. An indeterminate
    /// screening result stops generation with an error instead of looping;
    /// "could not check" is never treated as "clean".
    pub fn generate(&self) -> Result<SecretString> {
        loop {
            let candidate = draw_candidate();

            match self.checker.check(candidate.expose()) {
                BreachVerdict::Clean => return Ok(candidate),
                BreachVerdict::Breached(count) => {
                    debug!(count, "candidate found in breach corpus, redrawing");
                    // candidate drops here and is zeroed
                }
                BreachVerdict::Indeterminate => {
                    return Err(VaultError::BreachLookupFailed(
                        "breach screening was indeterminate".to_string(),
                    ));
                }
            }
        }
    }
}

impl Default for PasswordGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Draw one candidate from the weighted alphabet
fn draw_candidate() -> SecretString {
    let mut rng = OsRng;

    let length = rng.gen_range(MIN_LEN..=MAX_LEN);
    let mut candidate = String::with_capacity(MAX_LEN);

    for _ in 0..length {
        let index = rng.gen_range(0..DRAW_SET.len());
        candidate.push(DRAW_SET[index] as char);
    }

    SecretString::new(candidate)
}
