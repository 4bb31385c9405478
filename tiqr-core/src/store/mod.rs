//! Secret vault and identity registry
//!
//! The vault holds per-identity key material behind a PIN-gated
//! unlock; the registry persists the non-secret identity/provider
//! records and device registration state. The vault is an explicit
//! interface injected into `TiqrClient` so hosts and tests can swap
//! the backing store.

use crate::error::VaultError;
use crate::types::{Pin, SecretKey};

pub mod keyring;
pub mod memory;
pub mod registry;

pub use keyring::KeyringVault;
pub use memory::MemoryVault;

/// Durable, PIN-gated store of per-identity secrets
///
/// Entries are keyed by (identity, provider). Implementations own the
/// attempt-limiting/lockout policy; this crate only maps a failed
/// unlock to `VaultError::InvalidPin`.
pub trait SecretVault: Send + Sync {
    /// Store a secret for an identity, bound to the given PIN
    fn store(
        &self,
        identity: &str,
        provider: &str,
        secret: &SecretKey,
        pin: &Pin,
    ) -> Result<(), VaultError>;

    /// Unlock and return an identity's secret
    ///
    /// Fails with `VaultError::InvalidPin` when the supplied PIN does
    /// not match the one the secret was bound to.
    fn unlock(&self, identity: &str, provider: &str, pin: &Pin) -> Result<SecretKey, VaultError>;

    /// Delete an identity's secret; succeeds when no entry exists
    fn delete(&self, identity: &str, provider: &str) -> Result<(), VaultError>;

    /// Check whether a secret is stored for an identity
    fn contains(&self, identity: &str, provider: &str) -> Result<bool, VaultError>;
}

/// Constant-time comparison of two byte slices
///
/// Used for PIN verification so a mismatch does not leak how many
/// leading characters matched.
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_comparison() {
        assert!(constant_time_eq(b"1234", b"1234"));
        assert!(!constant_time_eq(b"1234", b"1235"));
        assert!(!constant_time_eq(b"1234", b"123"));
        assert!(constant_time_eq(b"", b""));
    }
}
