//! In-memory secret vault
//!
//! Instance-scoped vault used in tests, CI, and hosts without a system
//! keyring. Entries live only as long as the vault value itself.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::VaultError;
use crate::identity::vault_key;
use crate::store::{constant_time_eq, SecretVault};
use crate::types::{Pin, SecretKey};

/// Secret vault keeping entries in process memory
#[derive(Debug, Default)]
pub struct MemoryVault {
    entries: Mutex<HashMap<String, (String, Vec<u8>)>>,
}

impl MemoryVault {
    /// Create a new, empty vault
    pub fn new() -> Self {
        Self::default()
    }
}

impl SecretVault for MemoryVault {
    fn store(
        &self,
        identity: &str,
        provider: &str,
        secret: &SecretKey,
        pin: &Pin,
    ) -> Result<(), VaultError> {
        let mut entries = self.entries.lock().map_err(|_| VaultError::StoreFailed)?;
        entries.insert(
            vault_key(identity, provider),
            (pin.expose().to_string(), secret.expose().to_vec()),
        );
        Ok(())
    }

    fn unlock(&self, identity: &str, provider: &str, pin: &Pin) -> Result<SecretKey, VaultError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| VaultError::ServiceUnavailable)?;
        let (stored_pin, secret) = entries
            .get(&vault_key(identity, provider))
            .ok_or(VaultError::NotFound)?;

        if !constant_time_eq(stored_pin.as_bytes(), pin.expose().as_bytes()) {
            return Err(VaultError::InvalidPin);
        }

        Ok(SecretKey::new(secret.clone()))
    }

    fn delete(&self, identity: &str, provider: &str) -> Result<(), VaultError> {
        let mut entries = self.entries.lock().map_err(|_| VaultError::DeleteFailed)?;
        entries.remove(&vault_key(identity, provider));
        Ok(())
    }

    fn contains(&self, identity: &str, provider: &str) -> Result<bool, VaultError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| VaultError::ServiceUnavailable)?;
        Ok(entries.contains_key(&vault_key(identity, provider)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pin(digits: &str) -> Pin {
        Pin::new(digits.to_string()).unwrap()
    }

    #[test]
    fn test_store_and_unlock() {
        let vault = MemoryVault::new();
        let secret = SecretKey::new(vec![1, 2, 3, 4]);

        vault
            .store("jdoe", "idp.example.org", &secret, &pin("1234"))
            .unwrap();

        assert!(vault.contains("jdoe", "idp.example.org").unwrap());

        let unlocked = vault
            .unlock("jdoe", "idp.example.org", &pin("1234"))
            .unwrap();
        assert_eq!(unlocked.expose(), secret.expose());
    }

    #[test]
    fn test_wrong_pin_keeps_secret_intact() {
        let vault = MemoryVault::new();
        let secret = SecretKey::new(vec![9, 9, 9]);

        vault
            .store("jdoe", "idp.example.org", &secret, &pin("1234"))
            .unwrap();

        let result = vault.unlock("jdoe", "idp.example.org", &pin("4321"));
        assert_eq!(result.unwrap_err(), VaultError::InvalidPin);

        // The right PIN still unlocks the unchanged secret
        let unlocked = vault
            .unlock("jdoe", "idp.example.org", &pin("1234"))
            .unwrap();
        assert_eq!(unlocked.expose(), secret.expose());
    }

    #[test]
    fn test_unlock_missing_entry() {
        let vault = MemoryVault::new();
        let result = vault.unlock("nobody", "idp.example.org", &pin("1234"));
        assert_eq!(result.unwrap_err(), VaultError::NotFound);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let vault = MemoryVault::new();
        let secret = SecretKey::new(vec![5]);

        vault
            .store("jdoe", "idp.example.org", &secret, &pin("1234"))
            .unwrap();
        vault.delete("jdoe", "idp.example.org").unwrap();
        vault.delete("jdoe", "idp.example.org").unwrap();

        assert!(!vault.contains("jdoe", "idp.example.org").unwrap());
    }
}
