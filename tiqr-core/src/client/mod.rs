//! TIQR protocol client
//!
//! `TiqrClient` owns the HTTP client, the injected secret vault, and
//! the registry location, and drives the two network-involving
//! operations: parsing enrollment challenges (provider metadata fetch)
//! and completing challenges against the provider. Completions for the
//! same identity are serialized, and persistent state only changes
//! after a successful terminal reply.

use reqwest::Client;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use url::Url;

use crate::challenge::metadata::EnrollmentMetadata;
use crate::challenge::parse::{self, RawChallenge};
use crate::challenge::Challenge;
use crate::config::ClientConfig;
use crate::error::{
    ChallengeCompleteError, ChallengeParseError, ConfigError, Result, TiqrError,
};
use crate::store::registry::{registry_path, Registry};
use crate::store::SecretVault;
use crate::types::Pin;

mod authenticate;
mod enroll;
pub mod response;

/// Client for enrolling and authenticating against identity providers
pub struct TiqrClient {
    http: Client,
    vault: Arc<dyn SecretVault>,
    config: ClientConfig,
    registry_path: PathBuf,
    completion_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl TiqrClient {
    /// Create a client using the default registry location
    pub fn new(config: ClientConfig, vault: Arc<dyn SecretVault>) -> Result<Self> {
        let path = registry_path()?;
        Self::with_registry_path(config, vault, path)
    }

    /// Create a client persisting its registry at a specific path
    pub fn with_registry_path(
        config: ClientConfig,
        vault: Arc<dyn SecretVault>,
        registry_path: PathBuf,
    ) -> Result<Self> {
        config.validate()?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .use_rustls_tls()
            .build()
            .map_err(|e| {
                TiqrError::Config(ConfigError::ValidationError {
                    message: format!("Failed to create HTTP client: {}", e),
                })
            })?;

        Ok(Self {
            http,
            vault,
            config,
            registry_path,
            completion_locks: Mutex::new(HashMap::new()),
        })
    }

    /// Load the current registry state
    pub fn registry(&self) -> Result<Registry> {
        Registry::load(&self.registry_path)
    }

    pub(crate) fn save_registry(&self, registry: &Registry) -> Result<()> {
        registry.save(&self.registry_path)
    }

    /// The configuration this client was built with
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Parse and validate a raw challenge string
    ///
    /// Local decoding is pure; enrollment challenges additionally fetch
    /// the provider's metadata document. Never mutates persistent
    /// state, so an abandoned parse (dropped future) leaves nothing
    /// behind.
    #[tracing::instrument(skip_all)]
    pub async fn parse_challenge(&self, raw: &str) -> Result<Challenge> {
        match parse::split_scheme(raw)? {
            RawChallenge::Authentication(raw) => {
                let registry = self.registry()?;
                let challenge = parse::parse_authentication(
                    raw,
                    &registry,
                    self.config.protocol_compatibility_mode,
                )?;
                debug!(provider = %challenge.provider.identifier, "parsed authentication challenge");
                Ok(Challenge::Authentication(challenge))
            }
            RawChallenge::Enrollment(remainder) => {
                let (url, return_url) = parse::validate_enrollment_url(remainder)?;
                let metadata = self.fetch_enrollment_metadata(url).await?;
                let challenge = parse::build_enrollment(
                    metadata,
                    return_url,
                    self.config.protocol_compatibility_mode,
                )?;
                debug!(provider = %challenge.provider.identifier, "parsed enrollment challenge");
                Ok(Challenge::Enrollment(challenge))
            }
        }
    }

    /// Complete a confirmed challenge with the user's unlock factor
    ///
    /// Cancelling through the token aborts the operation before any
    /// vault or registry mutation; only `ConnectionError` failures are
    /// worth retrying.
    pub async fn complete_challenge(
        &self,
        challenge: &Challenge,
        pin: &Pin,
        cancel: &CancellationToken,
    ) -> Result<()> {
        match challenge {
            Challenge::Authentication(c) => self.complete_authentication(c, pin, cancel).await,
            Challenge::Enrollment(c) => self.complete_enrollment(c, pin, cancel).await,
        }
    }

    /// Record a new device token from the push notification collaborator
    pub fn on_new_device_token(&self, token: &str) -> Result<()> {
        let mut registry = self.registry()?;
        if registry.set_notification_token(token) {
            self.save_registry(&registry)?;
            info!("device token updated");
        }
        Ok(())
    }

    /// Remove an enrolled identity and its vault entry
    ///
    /// Returns whether the identity existed.
    pub fn remove_identity(&self, identifier: &str, provider: &str) -> Result<bool> {
        let mut registry = self.registry()?;
        if !registry.remove_identity(identifier, provider) {
            return Ok(false);
        }

        self.vault.delete(identifier, provider)?;
        self.save_registry(&registry)?;
        info!(identity = %identifier, "identity removed");
        Ok(true)
    }

    // The URL may carry a one-time enrollment key, so only the host
    // goes into the trace fields.
    #[tracing::instrument(skip_all, fields(host = %url.host_str().unwrap_or_default()))]
    async fn fetch_enrollment_metadata(&self, url: Url) -> Result<EnrollmentMetadata> {
        let unreachable_provider = || {
            TiqrError::Parse(ChallengeParseError::UnknownProvider {
                identifier: url.host_str().unwrap_or_default().to_string(),
            })
        };

        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|_| unreachable_provider())?;

        if !response.status().is_success() {
            return Err(unreachable_provider());
        }

        let body = response.text().await.map_err(|_| unreachable_provider())?;

        serde_json::from_str(&body).map_err(|_| {
            TiqrError::Parse(ChallengeParseError::MalformedChallenge {
                title: "Invalid enrollment".to_string(),
                message: "The provider metadata could not be read.".to_string(),
            })
        })
    }

    /// Serialize completions per identity
    ///
    /// At most one unlock/submit cycle runs per identity at a time, so
    /// concurrent completions cannot race on the same secret.
    pub(crate) fn completion_lock(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = match self.completion_locks.lock() {
            Ok(guard) => guard,
            // A poisoned map only means a past panic; the locks inside
            // are still valid.
            Err(poisoned) => poisoned.into_inner(),
        };

        locks.entry(key.to_string()).or_default().clone()
    }

    /// Submit a url-encoded completion body and return the reply text
    ///
    /// State mutation always happens after this returns, so a
    /// cancellation here leaves the client's persistent state intact.
    pub(crate) async fn submit_completion(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
        cancel: &CancellationToken,
    ) -> Result<String> {
        let request = self.http.post(endpoint).form(params);

        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(ChallengeCompleteError::Cancelled.into()),
            result = request.send() => {
                result.map_err(|e| TiqrError::Complete(connection_error(&e)))?
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Err(TiqrError::Complete(ChallengeCompleteError::ConnectionError {
                reason: format!("Provider replied with status {}", status),
            }));
        }

        let body = tokio::select! {
            _ = cancel.cancelled() => return Err(ChallengeCompleteError::Cancelled.into()),
            result = response.text() => {
                result.map_err(|e| TiqrError::Complete(connection_error(&e)))?
            }
        };

        Ok(body)
    }
}

/// Map a transport failure onto a displayable connection error
pub(crate) fn connection_error(e: &reqwest::Error) -> ChallengeCompleteError {
    let reason = if e.is_timeout() {
        "Request timed out".to_string()
    } else if e.is_connect() {
        "Connection refused or unreachable".to_string()
    } else {
        format!("Request failed: {}", e)
    };

    ChallengeCompleteError::ConnectionError { reason }
}
