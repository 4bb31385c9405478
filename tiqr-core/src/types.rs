//! Type definitions and wrappers for secure data handling
//!
//! This module provides type-safe wrappers for sensitive data using the
//! secrecy crate to prevent accidental exposure in logs or debug output.

use rand::rngs::OsRng;
use rand::RngCore;
use secrecy::{ExposeSecret, Secret};

use crate::error::{OtpError, VaultError};

/// Length in bytes of a freshly generated identity secret
pub const SECRET_LENGTH: usize = 32;

/// Wrapper for raw identity key material
///
/// Exclusively owned by the secret vault; exposed only when handed to
/// the OTP engine or hex-encoded onto the wire during enrollment.
/// Zeroed on drop.
pub struct SecretKey(Secret<Vec<u8>>);

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey([REDACTED])")
    }
}

impl SecretKey {
    /// Wrap existing key material
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(Secret::new(bytes))
    }

    /// Generate a fresh secret from the OS random number generator
    pub fn generate() -> Self {
        let mut bytes = vec![0u8; SECRET_LENGTH];
        OsRng.fill_bytes(&mut bytes);
        Self::new(bytes)
    }

    /// Decode key material from its hex-encoded vault representation
    pub fn from_hex(encoded: &str) -> Result<Self, VaultError> {
        let bytes = hex::decode(encoded).map_err(|_| VaultError::InvalidFormat)?;
        Ok(Self::new(bytes))
    }

    /// Expose the raw key bytes (use with caution!)
    ///
    /// This should only be called when passing the key to the OTP
    /// engine or encoding it for the enrollment request body.
    pub fn expose(&self) -> &[u8] {
        self.0.expose_secret()
    }
}

impl Clone for SecretKey {
    fn clone(&self) -> Self {
        Self::new(self.0.expose_secret().clone())
    }
}

/// Wrapper for the 4-digit PIN unlocking an identity's secret
///
/// The PIN is the knowledge factor gating every vault unlock. It must
/// be exactly 4 numeric digits.
#[derive(Clone, Debug)]
pub struct Pin(Secret<String>);

impl Pin {
    /// Create a new PIN from a string, validating the format
    ///
    /// # Errors
    ///
    /// Returns `OtpError::InvalidPinFormat` if the PIN is not exactly 4 numeric digits
    pub fn new(pin: String) -> Result<Self, OtpError> {
        if pin.len() != 4 {
            return Err(OtpError::InvalidPinFormat);
        }

        if !pin.chars().all(|c| c.is_ascii_digit()) {
            return Err(OtpError::InvalidPinFormat);
        }

        Ok(Self(Secret::new(pin)))
    }

    /// Expose the PIN value (use with caution!)
    ///
    /// This should only be called by a vault implementation verifying
    /// the unlock factor.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

/// Wrapper for a generated OTP response code
///
/// Response codes should be treated as sensitive even though they have
/// a short lifetime; they are never logged.
#[derive(Clone, Debug)]
pub struct OtpResponse(Secret<String>);

impl OtpResponse {
    /// Create a new response from a generated code
    pub fn new(code: String) -> Self {
        Self(Secret::new(code))
    }

    /// Expose the response value (use with caution!)
    ///
    /// This should only be called when submitting the response to the
    /// provider.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl From<String> for OtpResponse {
    fn from(code: String) -> Self {
        Self::new(code)
    }
}

/// Keyring service name for identity secrets
pub const KEYRING_SERVICE_SECRET: &str = "tiqr-identity-secret";
/// Keyring service name for identity PINs
pub const KEYRING_SERVICE_PIN: &str = "tiqr-identity-pin";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_secret_length() {
        let secret = SecretKey::generate();
        assert_eq!(secret.expose().len(), SECRET_LENGTH);
    }

    #[test]
    fn test_generated_secrets_differ() {
        let a = SecretKey::generate();
        let b = SecretKey::generate();
        assert_ne!(a.expose(), b.expose());
    }

    #[test]
    fn test_secret_hex_roundtrip() {
        let secret = SecretKey::new(vec![0xde, 0xad, 0xbe, 0xef]);
        let encoded = hex::encode(secret.expose());
        let decoded = SecretKey::from_hex(&encoded).unwrap();
        assert_eq!(secret.expose(), decoded.expose());
    }

    #[test]
    fn test_secret_from_invalid_hex() {
        let result = SecretKey::from_hex("not hex at all");
        assert_eq!(result.unwrap_err(), VaultError::InvalidFormat);
    }

    #[test]
    fn test_valid_pin() {
        let pin = Pin::new("1234".to_string()).unwrap();
        assert_eq!(pin.expose(), "1234");
    }

    #[test]
    fn test_invalid_pins() {
        let invalid = vec!["123", "12345", "12a4", "    ", "١٢٣٤"];

        for pin in invalid {
            assert!(matches!(
                Pin::new(pin.to_string()),
                Err(OtpError::InvalidPinFormat)
            ));
        }
    }
}
