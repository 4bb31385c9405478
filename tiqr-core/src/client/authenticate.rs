//! Authentication challenge completion
//!
//! Unlocks the identity's secret, derives the one-time response for
//! the challenge's numeric question, and submits it to the provider's
//! authentication endpoint.

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::challenge::AuthenticationChallenge;
use crate::client::response::interpret_reply;
use crate::client::TiqrClient;
use crate::error::{ChallengeCompleteError, Result, TiqrError, VaultError};
use crate::otp::{generate_otp, OcraSuite};
use crate::types::{OtpResponse, Pin};

impl TiqrClient {
    /// Complete an authentication challenge
    ///
    /// Fails with `InvalidPin` before any network traffic when the
    /// vault rejects the unlock factor; authentication never mutates
    /// persistent state, so any failure leaves the client as it was.
    #[tracing::instrument(skip_all, fields(provider = %challenge.provider.identifier))]
    pub(crate) async fn complete_authentication(
        &self,
        challenge: &AuthenticationChallenge,
        pin: &Pin,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let identity = challenge
            .identity
            .as_ref()
            .ok_or(ChallengeCompleteError::InvalidUser)?;

        let lock = self.completion_lock(&identity.vault_key());
        let _guard = lock.lock().await;

        if cancel.is_cancelled() {
            return Err(ChallengeCompleteError::Cancelled.into());
        }

        let secret = self
            .vault
            .unlock(&identity.identifier, &challenge.provider.identifier, pin)
            .map_err(|e| match e {
                VaultError::InvalidPin => TiqrError::Complete(ChallengeCompleteError::InvalidPin),
                other => TiqrError::Vault(other),
            })?;

        let suite = OcraSuite::parse(&challenge.provider.ocra_suite)?;
        let moving_factor = suite.moving_factor(&challenge.challenge)?;
        let response = OtpResponse::new(generate_otp(
            secret.expose(),
            moving_factor,
            suite.code_digits,
            false,
            -1,
        )?);

        let registration = self.registry()?.registration;
        let mut params: Vec<(&str, String)> = vec![
            ("sessionKey", challenge.session_key.clone()),
            ("challenge", challenge.challenge.clone()),
            ("userId", identity.identifier.clone()),
            ("response", response.expose().to_string()),
            ("operation", "login".to_string()),
        ];
        if let Some(token) = registration.notification_token {
            params.push(("notificationType", self.config().notification_type.clone()));
            params.push(("notificationAddress", token));
        }

        let body = self
            .submit_completion(&challenge.provider.authentication_url, &params, cancel)
            .await?;

        interpret_reply(&body, challenge.protocol_version.as_deref())
            .map_err(TiqrError::Complete)?;

        debug!(identity = %identity.identifier, "authentication completed");
        Ok(())
    }
}
