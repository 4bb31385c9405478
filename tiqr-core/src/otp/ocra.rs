//! OCRA suite handling
//!
//! Providers declare the challenge-response variant they verify as an
//! OCRA suite string in their enrollment metadata, e.g.
//! `OCRA-1:HOTP-SHA1-6:QN10`. This client implements the HOTP-SHA1
//! family with a numeric question; anything else is rejected up front
//! so a mismatched enrollment fails loudly instead of producing codes
//! the server will never accept.

use crate::error::OtpError;

/// Suite assumed when enrollment metadata does not declare one
pub const DEFAULT_OCRA_SUITE: &str = "OCRA-1:HOTP-SHA1-6:QN10";

/// A parsed, supported OCRA suite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcraSuite {
    /// Number of response digits the provider verifies
    pub code_digits: usize,

    /// Maximum length of the numeric challenge question
    pub question_length: usize,
}

impl Default for OcraSuite {
    fn default() -> Self {
        Self {
            code_digits: 6,
            question_length: 10,
        }
    }
}

impl OcraSuite {
    /// Parse a provider-declared suite string
    ///
    /// Accepts `OCRA-1` suites using HOTP-SHA1 with 6 to 8 response
    /// digits and a numeric question (`QNxx`).
    ///
    /// # Errors
    ///
    /// Returns `OtpError::UnsupportedAlgorithm` for any other suite.
    pub fn parse(suite: &str) -> Result<Self, OtpError> {
        let unsupported = || OtpError::UnsupportedAlgorithm {
            suite: suite.to_string(),
        };

        let mut parts = suite.split(':');
        let (Some(version), Some(crypto), Some(data_input), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(unsupported());
        };

        if version != "OCRA-1" {
            return Err(unsupported());
        }

        let code_digits = match crypto.split('-').collect::<Vec<_>>()[..] {
            ["HOTP", "SHA1", digits] => digits
                .parse::<usize>()
                .ok()
                .filter(|d| (6..=8).contains(d))
                .ok_or_else(unsupported)?,
            _ => return Err(unsupported()),
        };

        let question_length = data_input
            .strip_prefix("QN")
            .and_then(|len| len.parse::<usize>().ok())
            // u64 holds at most 19 decimal digits
            .filter(|len| (1..=19).contains(len))
            .ok_or_else(unsupported)?;

        Ok(Self {
            code_digits,
            question_length,
        })
    }

    /// Derive the OTP moving factor from a challenge nonce
    ///
    /// The nonce is the suite's numeric question: decimal digits, at
    /// most `question_length` of them.
    ///
    /// # Errors
    ///
    /// Returns `OtpError::InvalidChallengeNonce` if the nonce is empty,
    /// non-numeric, or longer than the question allows.
    pub fn moving_factor(&self, nonce: &str) -> Result<u64, OtpError> {
        let invalid = || OtpError::InvalidChallengeNonce {
            nonce: nonce.to_string(),
        };

        if nonce.is_empty()
            || nonce.len() > self.question_length
            || !nonce.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        nonce.parse::<u64>().map_err(|_| invalid())
    }
}
