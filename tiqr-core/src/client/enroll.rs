//! Enrollment challenge completion
//!
//! Generates a fresh identity secret, confirms the enrollment with the
//! provider, and only then persists the identity and its secret. A
//! rejected or cancelled enrollment leaves no trace.

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::challenge::EnrollmentChallenge;
use crate::client::response::interpret_reply;
use crate::client::TiqrClient;
use crate::error::{ChallengeCompleteError, Result, TiqrError};
use crate::otp::OcraSuite;
use crate::types::{Pin, SecretKey};

impl TiqrClient {
    /// Complete an enrollment challenge
    ///
    /// On success the new identity is in the registry and its secret in
    /// the vault, bound to the supplied PIN. The vault write happens
    /// first and is rolled back if the registry save fails, so the two
    /// stores never disagree about an enrollment.
    #[tracing::instrument(skip_all, fields(provider = %challenge.provider.identifier))]
    pub(crate) async fn complete_enrollment(
        &self,
        challenge: &EnrollmentChallenge,
        pin: &Pin,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let identity = challenge
            .identity
            .as_ref()
            .ok_or(ChallengeCompleteError::InvalidUser)?;

        // Refuse to enroll against a suite this client cannot answer;
        // the identity would be unusable for authentication.
        OcraSuite::parse(&challenge.provider.ocra_suite)?;

        let lock = self.completion_lock(&identity.vault_key());
        let _guard = lock.lock().await;

        if cancel.is_cancelled() {
            return Err(ChallengeCompleteError::Cancelled.into());
        }

        let secret = SecretKey::generate();

        let registration = self.registry()?.registration;
        let mut params: Vec<(&str, String)> = vec![
            ("secret", hex::encode(secret.expose())),
            ("operation", "register".to_string()),
        ];
        if let Some(token) = registration.notification_token {
            params.push(("notificationType", self.config().notification_type.clone()));
            params.push(("notificationAddress", token));
        }

        let body = self
            .submit_completion(&challenge.enrollment_url, &params, cancel)
            .await?;

        interpret_reply(&body, challenge.protocol_version.as_deref())
            .map_err(TiqrError::Complete)?;

        self.vault.store(
            &identity.identifier,
            &challenge.provider.identifier,
            &secret,
            pin,
        )?;

        let mut registry = self.registry()?;
        registry.register_provider(challenge.provider.clone());
        registry.insert_identity(identity.clone());

        if let Err(e) = self.save_registry(&registry) {
            let _ = self
                .vault
                .delete(&identity.identifier, &challenge.provider.identifier);
            return Err(e);
        }

        info!(
            identity = %identity.identifier,
            provider = %challenge.provider.identifier,
            "identity enrolled"
        );
        Ok(())
    }
}
