//! Breach corpus lookup
//!
//! Candidates are screened against the Have I Been Pwned range API using
//! k-anonymity: only the first five hex characters of the candidate's SHA-1
//! digest leave the machine. The response lists every known suffix under
//! that prefix together with its breach count.

use std::time::Duration;

use sha1::{Digest, Sha1};
use tracing::{debug, warn};

/// Range query endpoint, keyed by 5-character digest prefix
const RANGE_ENDPOINT: &str = "https://api.pwnedpasswords.com/range";

/// Bound on the lookup; expiry is reported as indeterminate
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Length of the transmitted digest prefix in hex characters
const PREFIX_LEN: usize = 5;

/// Outcome of screening one candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreachVerdict {
    /// The candidate's digest is absent from the corpus
    Clean,
    /// The candidate appears in the corpus, with its breach count
    Breached(u32),
    /// The lookup could not be completed; says nothing about the candidate
    Indeterminate,
}

/// Trait for breach screening backends
///
/// The generator only sees this seam, so tests can substitute a stub.
pub trait BreachCheck: Send + Sync {
    /// Screen one candidate password
    fn check(&self, candidate: &str) -> BreachVerdict;
}

/// Breach checker backed by the range query endpoint
pub struct HibpChecker {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HibpChecker {
    /// Create a checker against the public endpoint
    pub fn new() -> Self {
        Self::with_base_url(RANGE_ENDPOINT.to_string())
    }

    /// Create a checker against a custom endpoint (for testing)
    pub fn with_base_url(base_url: String) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(LOOKUP_TIMEOUT)
            .build()
            .expect("default TLS backend is available");

        Self { client, base_url }
    }

    /// Fetch the suffix list for a digest prefix
    fn lookup_range(&self, prefix: &str) -> Result<String, String> {
        let url = format!("{}/{}", self.base_url, prefix);

        let response = self.client.get(&url).send().map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("unexpected status {}", status));
        }

        response.text().map_err(|e| e.to_string())
    }
}

impl Default for HibpChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl BreachCheck for HibpChecker {
    fn check(&self, candidate: &str) -> BreachVerdict {
        let digest = candidate_digest(candidate);
        let (prefix, suffix) = digest.split_at(PREFIX_LEN);

        match self.lookup_range(prefix) {
            Ok(body) => {
                let verdict = scan_range(&body, suffix);
                debug!(?verdict, "breach lookup completed");
                verdict
            }
            Err(reason) => {
                warn!(%reason, "breach lookup failed");
                BreachVerdict::Indeterminate
            }
        }
    }
}

/// Uppercase hex SHA-1 digest of the candidate
fn candidate_digest(candidate: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(candidate.as_bytes());
    hex::encode_upper(hasher.finalize())
}

/// Scan a range response body for a digest suffix
///
/// The body is `\r\n`-separated `SUFFIX:COUNT` lines. An empty or
/// malformed body is indeterminate; it must never pass as clean.
fn scan_range(body: &str, suffix: &str) -> BreachVerdict {
    if body.trim().is_empty() {
        return BreachVerdict::Indeterminate;
    }

    for line in body.split("\r\n") {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some((entry_suffix, count)) = line.split_once(':') else {
            return BreachVerdict::Indeterminate;
        };
        let Ok(count) = count.trim().parse::<u32>() else {
            return BreachVerdict::Indeterminate;
        };

        if entry_suffix.eq_ignore_ascii_case(suffix) && count > 0 {
            return BreachVerdict::Breached(count);
        }
    }

    BreachVerdict::Clean
}

#[cfg(test)]
mod tests {
    use super::*;

    // SHA-1("password"), a fixture from the range API documentation
    const PASSWORD_DIGEST: &str = "5BAA61E4C9B93F3F0682250B6CF8331B7EE68FD8";

    #[test]
    fn test_candidate_digest() {
        assert_eq!(candidate_digest("password"), PASSWORD_DIGEST);
    }

    #[test]
    fn test_digest_split() {
        let (prefix, suffix) = PASSWORD_DIGEST.split_at(PREFIX_LEN);
        assert_eq!(prefix, "5BAA6");
        assert_eq!(suffix, "1E4C9B93F3F0682250B6CF8331B7EE68FD8");
    }

    #[test]
    fn test_scan_finds_breached_suffix() {
        let body = "0018A45C4D1DEF81644B54AB7F969B88D65:3\r\n\
                    1E4C9B93F3F0682250B6CF8331B7EE68FD8:9545824\r\n\
                    011053FD0102E94D6AE2F8B83D76FAF94F6:1";

        let verdict = scan_range(body, "1E4C9B93F3F0682250B6CF8331B7EE68FD8");
        assert_eq!(verdict, BreachVerdict::Breached(9545824));
    }

    #[test]
    fn test_scan_absent_suffix_is_clean() {
        let body = "0018A45C4D1DEF81644B54AB7F969B88D65:3\r\n\
                    011053FD0102E94D6AE2F8B83D76FAF94F6:1";

        let verdict = scan_range(body, "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF");
        assert_eq!(verdict, BreachVerdict::Clean);
    }

    #[test]
    fn test_scan_empty_body_is_indeterminate() {
        assert_eq!(scan_range("", "ABC"), BreachVerdict::Indeterminate);
        assert_eq!(scan_range("  \r\n ", "ABC"), BreachVerdict::Indeterminate);
    }

    #[test]
    fn test_scan_malformed_body_is_indeterminate() {
        assert_eq!(
            scan_range("no separator here", "ABC"),
            BreachVerdict::Indeterminate
        );
        assert_eq!(
            scan_range("SUFFIX:not-a-number", "ABC"),
            BreachVerdict::Indeterminate
        );
    }

    #[test]
    fn test_scan_count_zero_is_not_breached() {
        let body = "1E4C9B93F3F0682250B6CF8331B7EE68FD8:0";
        assert_eq!(
            scan_range(body, "1E4C9B93F3F0682250B6CF8331B7EE68FD8"),
            BreachVerdict::Clean
        );
    }

    #[test]
    fn test_unreachable_endpoint_is_indeterminate() {
        // Reserved TEST-NET-1 address; connection fails fast
        let checker = HibpChecker::with_base_url("http://192.0.2.1:9/range".to_string());
        assert_eq!(checker.check("password"), BreachVerdict::Indeterminate);
    }
}
