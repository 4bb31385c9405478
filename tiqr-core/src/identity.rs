//! Identity and identity-provider model
//!
//! An `Identity` is a user account enrolled with an `IdentityProvider`.
//! Both are persisted in the registry; identities are unique per
//! (identifier, provider) pair, providers are immutable once registered
//! and shared read-only by the identities under them.

use serde::{Deserialize, Serialize};

/// A user identity enrolled with an identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Account identifier assigned by the provider
    pub identifier: String,

    /// Human-readable account name
    pub display_name: String,

    /// Identifier of the provider this identity is enrolled with
    pub provider: String,
}

/// An identity provider, as declared by its enrollment metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityProvider {
    /// Provider identifier (typically its domain name)
    pub identifier: String,

    /// Human-readable provider name
    pub display_name: String,

    /// Endpoint authentication responses are submitted to
    pub authentication_url: String,

    /// OCRA suite the provider verifies responses against
    pub ocra_suite: String,

    /// Optional informational page about the provider
    pub info_url: Option<String>,

    /// Optional provider logo
    pub logo_url: Option<String>,
}

impl Identity {
    /// Vault entry key for this identity, unique across providers
    pub fn vault_key(&self) -> String {
        vault_key(&self.identifier, &self.provider)
    }
}

/// Vault entry key for an (identity, provider) pair
pub fn vault_key(identifier: &str, provider: &str) -> String {
    format!("{}@{}", identifier, provider)
}
