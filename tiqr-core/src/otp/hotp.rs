//! HMAC-based OTP generation (RFC 4226)
//!
//! Implements the OATH HOTP reference algorithm, including the optional
//! Luhn-style checksum digit and the fixed-truncation-offset mode. Any
//! deviation here breaks interoperability with the server-side
//! verifier, so the published RFC 4226 test vectors are pinned in the
//! integration tests.

use crate::error::OtpError;
use crate::otp::hmac::hmac_sha1;

/// Powers of ten indexed by digit count; bounds the supported OTP length
const DIGITS_POWER: [u64; 9] = [
    1,
    10,
    100,
    1_000,
    10_000,
    100_000,
    1_000_000,
    10_000_000,
    100_000_000,
];

/// Doubled-digit lookup for the checksum: 0*2, 1*2, ..., with digit
/// sums applied to results above 9 (so 5 -> 10 -> 1)
const DOUBLE_DIGITS: [u64; 10] = [0, 2, 4, 6, 8, 1, 3, 5, 7, 9];

/// Luhn-style checksum over `digits` significant places of `code`
///
/// Digits are doubled alternately starting from the least-significant
/// place; the checksum digit brings the total to a multiple of ten.
fn checksum(mut code: u64, digits: usize) -> u64 {
    let mut double = true;
    let mut total = 0;

    for _ in 0..digits {
        let mut digit = code % 10;
        code /= 10;
        if double {
            digit = DOUBLE_DIGITS[digit as usize];
        }
        total += digit;
        double = !double;
    }

    let remainder = total % 10;
    if remainder > 0 {
        10 - remainder
    } else {
        0
    }
}

/// Generate a one-time response code
///
/// # Arguments
/// * `secret` - raw shared key material
/// * `moving_factor` - counter or challenge-derived value, encoded as 8 bytes big-endian
/// * `code_digits` - number of response digits (6-8 typical)
/// * `add_checksum` - append a Luhn-style checksum digit
/// * `truncation_offset` - fixed digest offset, or any out-of-range value
///   (conventionally -1) for dynamic truncation
///
/// # Errors
///
/// Returns `OtpError::InvalidKey` for an empty secret and
/// `OtpError::InvalidDigits` for an unsupported digit count. Pure
/// computation, no side effects.
pub fn generate_otp(
    secret: &[u8],
    moving_factor: u64,
    code_digits: usize,
    add_checksum: bool,
    truncation_offset: i32,
) -> Result<String, OtpError> {
    if secret.is_empty() {
        return Err(OtpError::InvalidKey);
    }

    if code_digits == 0 || code_digits >= DIGITS_POWER.len() {
        return Err(OtpError::InvalidDigits {
            digits: code_digits,
        });
    }

    let hash = hmac_sha1(secret, &moving_factor.to_be_bytes());

    // Dynamic truncation: low nibble of the last digest byte, unless a
    // fixed offset within [0, len-4) was requested. Edge values are
    // deliberately not reinterpreted.
    let mut offset = (hash[hash.len() - 1] & 0x0f) as usize;
    if truncation_offset >= 0 && (truncation_offset as usize) < hash.len() - 4 {
        offset = truncation_offset as usize;
    }

    // 31-bit big-endian extract, top bit masked off
    let binary = (u64::from(hash[offset] & 0x7f) << 24)
        | (u64::from(hash[offset + 1]) << 16)
        | (u64::from(hash[offset + 2]) << 8)
        | u64::from(hash[offset + 3]);

    let mut otp = binary % DIGITS_POWER[code_digits];
    let mut digits = code_digits;

    if add_checksum {
        otp = otp * 10 + checksum(otp, code_digits);
        digits += 1;
    }

    Ok(format!("{:0width$}", otp, width = digits))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RFC4226_SECRET: &[u8] = b"12345678901234567890";

    #[test]
    fn test_checksum_brings_total_to_multiple_of_ten() {
        // 755224 -> doubled alternately from the right:
        // 8 + 2 + 4 + 5 + 1 + 7 = 27, checksum 3
        assert_eq!(checksum(755_224, 6), 3);
    }

    #[test]
    fn test_checksum_zero_total() {
        assert_eq!(checksum(0, 6), 0);
    }

    #[test]
    fn test_empty_secret_rejected() {
        let result = generate_otp(&[], 0, 6, false, -1);
        assert_eq!(result.unwrap_err(), OtpError::InvalidKey);
    }

    #[test]
    fn test_unsupported_digit_counts_rejected() {
        for digits in [0, 9, 12] {
            let result = generate_otp(RFC4226_SECRET, 0, digits, false, -1);
            assert_eq!(result.unwrap_err(), OtpError::InvalidDigits { digits });
        }
    }

    #[test]
    fn test_fixed_truncation_offset() {
        // RFC 4226 intermediate digest for count 1 starts 0x75a48a19;
        // offset 0 extracts 0x75a48a19 % 10^6 = 717529.
        let otp = generate_otp(RFC4226_SECRET, 1, 6, false, 0).unwrap();
        assert_eq!(otp, "717529");
    }

    #[test]
    fn test_out_of_range_offset_falls_back_to_dynamic() {
        let dynamic = generate_otp(RFC4226_SECRET, 1, 6, false, -1).unwrap();

        // 16 is the first invalid fixed offset for a 20-byte digest
        for offset in [16, 19, 100] {
            let otp = generate_otp(RFC4226_SECRET, 1, 6, false, offset).unwrap();
            assert_eq!(otp, dynamic);
        }
    }

    #[test]
    fn test_checksum_variant_appends_one_digit() {
        let plain = generate_otp(RFC4226_SECRET, 0, 6, false, -1).unwrap();
        let checked = generate_otp(RFC4226_SECRET, 0, 6, true, -1).unwrap();

        assert_eq!(plain.len(), 6);
        assert_eq!(checked.len(), 7);
        assert!(checked.starts_with(&plain));
    }
}
