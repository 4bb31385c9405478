//! Keyring-backed secret vault
//!
//! Uses the system keyring (Secret Service on Linux) to store identity
//! secrets and the PINs they are bound to. Key material is hex-encoded
//! into the keyring's password slot; the PIN lives in a companion
//! entry and is compared in constant time on unlock.

use keyring::Entry;

use crate::error::VaultError;
use crate::identity::vault_key;
use crate::store::{constant_time_eq, SecretVault};
use crate::types::{Pin, SecretKey, KEYRING_SERVICE_PIN, KEYRING_SERVICE_SECRET};

/// Secret vault backed by the system keyring
#[derive(Debug, Default)]
pub struct KeyringVault;

impl KeyringVault {
    /// Create a new keyring-backed vault
    pub fn new() -> Self {
        Self
    }

    fn entry(service: &str, identity: &str, provider: &str) -> Result<Entry, VaultError> {
        Entry::new(service, &vault_key(identity, provider))
            .map_err(|_| VaultError::ServiceUnavailable)
    }

    fn read(entry: &Entry) -> Result<String, VaultError> {
        entry.get_password().map_err(|e| match e {
            keyring::Error::NoEntry => VaultError::NotFound,
            _ => VaultError::ServiceUnavailable,
        })
    }

    fn remove(entry: &Entry) -> Result<(), VaultError> {
        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(_) => Err(VaultError::DeleteFailed),
        }
    }
}

impl SecretVault for KeyringVault {
    fn store(
        &self,
        identity: &str,
        provider: &str,
        secret: &SecretKey,
        pin: &Pin,
    ) -> Result<(), VaultError> {
        let pin_entry = Self::entry(KEYRING_SERVICE_PIN, identity, provider)?;
        pin_entry
            .set_password(pin.expose())
            .map_err(|_| VaultError::StoreFailed)?;

        let secret_entry = Self::entry(KEYRING_SERVICE_SECRET, identity, provider)?;
        if let Err(e) = secret_entry.set_password(&hex::encode(secret.expose())) {
            // Do not leave a dangling PIN entry behind
            let _ = Self::remove(&pin_entry);
            tracing::warn!(error = %e, "failed to store identity secret");
            return Err(VaultError::StoreFailed);
        }

        Ok(())
    }

    fn unlock(&self, identity: &str, provider: &str, pin: &Pin) -> Result<SecretKey, VaultError> {
        let pin_entry = Self::entry(KEYRING_SERVICE_PIN, identity, provider)?;
        let stored_pin = Self::read(&pin_entry)?;

        if !constant_time_eq(stored_pin.as_bytes(), pin.expose().as_bytes()) {
            return Err(VaultError::InvalidPin);
        }

        let secret_entry = Self::entry(KEYRING_SERVICE_SECRET, identity, provider)?;
        SecretKey::from_hex(&Self::read(&secret_entry)?)
    }

    fn delete(&self, identity: &str, provider: &str) -> Result<(), VaultError> {
        Self::remove(&Self::entry(KEYRING_SERVICE_SECRET, identity, provider)?)?;
        Self::remove(&Self::entry(KEYRING_SERVICE_PIN, identity, provider)?)
    }

    fn contains(&self, identity: &str, provider: &str) -> Result<bool, VaultError> {
        let secret_entry = Self::entry(KEYRING_SERVICE_SECRET, identity, provider)?;
        match Self::read(&secret_entry) {
            Ok(_) => Ok(true),
            Err(VaultError::NotFound) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
