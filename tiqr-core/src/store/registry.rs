//! Identity registry persistence
//!
//! TOML-backed store of the non-secret client state: registered
//! identity providers, enrolled identities, and device registration.
//! Saves go through a temp-file rename so a crash mid-write never
//! leaves a half-written registry behind.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config;
use crate::error::{ConfigError, Result, TiqrError};
use crate::identity::{Identity, IdentityProvider};

/// Default registry file name
const REGISTRY_FILE_NAME: &str = "registry.toml";

/// Persisted device registration state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRegistration {
    /// Push notification token last handed to us by the platform
    pub notification_token: Option<String>,

    /// Set when the token changed and has not been revalidated with
    /// the providers yet
    #[serde(default)]
    pub should_validate_token: bool,
}

/// The client's persisted identity/provider records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Registry {
    #[serde(rename = "provider", default)]
    pub providers: Vec<IdentityProvider>,

    #[serde(rename = "identity", default)]
    pub identities: Vec<Identity>,

    #[serde(default)]
    pub registration: DeviceRegistration,
}

/// Get the default registry file path
pub fn registry_path() -> Result<PathBuf> {
    Ok(config::config_dir()?.join(REGISTRY_FILE_NAME))
}

impl Registry {
    /// Load the registry from a TOML file
    ///
    /// A missing file is an empty registry, not an error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(TiqrError::Config(ConfigError::IoError {
                    message: format!("Failed to read registry file: {}", e),
                }))
            }
        };

        Ok(toml::from_str(&contents)?)
    }

    /// Save the registry to a TOML file
    ///
    /// Writes a sibling temp file first and renames it into place, so
    /// the registry on disk is always either the old or the new state.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                TiqrError::Config(ConfigError::IoError {
                    message: format!("Failed to create registry directory: {}", e),
                })
            })?;
        }

        let contents = toml::to_string_pretty(self)?;

        let staging = path.with_extension("toml.tmp");
        std::fs::write(&staging, contents).map_err(|_| {
            TiqrError::Config(ConfigError::SaveFailed {
                path: staging.to_string_lossy().to_string(),
            })
        })?;

        std::fs::rename(&staging, path).map_err(|_| {
            TiqrError::Config(ConfigError::SaveFailed {
                path: path.to_string_lossy().to_string(),
            })
        })
    }

    /// Look up a registered provider by identifier
    pub fn provider_by_id(&self, identifier: &str) -> Option<&IdentityProvider> {
        self.providers.iter().find(|p| p.identifier == identifier)
    }

    /// Look up an enrolled identity by identifier and provider
    pub fn identity_by_id(&self, identifier: &str, provider: &str) -> Option<&Identity> {
        self.identities
            .iter()
            .find(|i| i.identifier == identifier && i.provider == provider)
    }

    /// All identities enrolled with a provider
    pub fn identities_for_provider(&self, provider: &str) -> Vec<&Identity> {
        self.identities
            .iter()
            .filter(|i| i.provider == provider)
            .collect()
    }

    /// Register a provider unless one with the same identifier exists
    ///
    /// Providers are immutable once registered; re-enrollments reuse
    /// the stored record.
    pub fn register_provider(&mut self, provider: IdentityProvider) {
        if self.provider_by_id(&provider.identifier).is_none() {
            self.providers.push(provider);
        }
    }

    /// Insert or refresh an enrolled identity
    ///
    /// Re-enrolling an existing (identifier, provider) pair updates its
    /// display name instead of duplicating the record.
    pub fn insert_identity(&mut self, identity: Identity) {
        if let Some(existing) = self
            .identities
            .iter_mut()
            .find(|i| i.identifier == identity.identifier && i.provider == identity.provider)
        {
            existing.display_name = identity.display_name;
        } else {
            self.identities.push(identity);
        }
    }

    /// Remove an enrolled identity
    ///
    /// Drops the provider record as well when its last identity goes.
    /// Returns whether an identity was removed.
    pub fn remove_identity(&mut self, identifier: &str, provider: &str) -> bool {
        let before = self.identities.len();
        self.identities
            .retain(|i| !(i.identifier == identifier && i.provider == provider));
        let removed = self.identities.len() != before;

        if removed && self.identities_for_provider(provider).is_empty() {
            self.providers.retain(|p| p.identifier != provider);
        }

        removed
    }

    /// Record a new device token from the push notification collaborator
    ///
    /// Returns true when the token changed; a changed token raises
    /// `should_validate_token` until the providers have seen it.
    pub fn set_notification_token(&mut self, token: &str) -> bool {
        if self.registration.notification_token.as_deref() == Some(token) {
            return false;
        }

        self.registration.notification_token = Some(token.to_string());
        self.registration.should_validate_token = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn provider(identifier: &str) -> IdentityProvider {
        IdentityProvider {
            identifier: identifier.to_string(),
            display_name: "Example Org".to_string(),
            authentication_url: format!("https://{}/tiqr/auth", identifier),
            ocra_suite: "OCRA-1:HOTP-SHA1-6:QN10".to_string(),
            info_url: None,
            logo_url: None,
        }
    }

    fn identity(identifier: &str, provider: &str) -> Identity {
        Identity {
            identifier: identifier.to_string(),
            display_name: identifier.to_uppercase(),
            provider: provider.to_string(),
        }
    }

    #[test]
    fn test_load_missing_registry_is_empty() {
        let temp_dir = tempdir().unwrap();
        let registry = Registry::load(temp_dir.path().join("missing.toml")).unwrap();
        assert_eq!(registry, Registry::default());
    }

    #[test]
    fn test_roundtrip() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("registry.toml");

        let mut registry = Registry::default();
        registry.register_provider(provider("idp.example.org"));
        registry.insert_identity(identity("jdoe", "idp.example.org"));
        registry.set_notification_token("token-1");

        registry.save(&path).unwrap();
        let loaded = Registry::load(&path).unwrap();

        assert_eq!(registry, loaded);
    }

    #[test]
    fn test_register_provider_is_immutable() {
        let mut registry = Registry::default();
        registry.register_provider(provider("idp.example.org"));

        let mut changed = provider("idp.example.org");
        changed.display_name = "Changed".to_string();
        registry.register_provider(changed);

        assert_eq!(registry.providers.len(), 1);
        assert_eq!(
            registry.provider_by_id("idp.example.org").unwrap().display_name,
            "Example Org"
        );
    }

    #[test]
    fn test_insert_identity_refreshes_display_name() {
        let mut registry = Registry::default();
        registry.insert_identity(identity("jdoe", "idp.example.org"));

        let mut renamed = identity("jdoe", "idp.example.org");
        renamed.display_name = "John D.".to_string();
        registry.insert_identity(renamed);

        assert_eq!(registry.identities.len(), 1);
        assert_eq!(registry.identities[0].display_name, "John D.");
    }

    #[test]
    fn test_remove_last_identity_prunes_provider() {
        let mut registry = Registry::default();
        registry.register_provider(provider("idp.example.org"));
        registry.insert_identity(identity("jdoe", "idp.example.org"));
        registry.insert_identity(identity("asmith", "idp.example.org"));

        assert!(registry.remove_identity("jdoe", "idp.example.org"));
        assert!(registry.provider_by_id("idp.example.org").is_some());

        assert!(registry.remove_identity("asmith", "idp.example.org"));
        assert!(registry.provider_by_id("idp.example.org").is_none());

        assert!(!registry.remove_identity("asmith", "idp.example.org"));
    }

    #[test]
    fn test_notification_token_flow() {
        let mut registry = Registry::default();

        assert!(registry.set_notification_token("token-1"));
        assert!(registry.registration.should_validate_token);

        registry.registration.should_validate_token = false;
        assert!(!registry.set_notification_token("token-1"));
        assert!(!registry.registration.should_validate_token);

        assert!(registry.set_notification_token("token-2"));
        assert!(registry.registration.should_validate_token);
    }
}
