//! Enroll command implementation
//!
//! Parses an enrollment challenge, asks for confirmation and a PIN,
//! and completes the enrollment against the provider.

use colored::Colorize;
use tiqr_core::challenge::Challenge;
use tiqr_core::error::{ConfigError, Result, TiqrError};

use crate::cli::{build_client, cancel_on_interrupt, prompt_yes_no, resolve_pin};

/// Run the enroll command
pub async fn run_enroll(raw: &str, pin: Option<String>) -> Result<()> {
    let client = build_client()?;

    let challenge = match client.parse_challenge(raw).await? {
        Challenge::Enrollment(challenge) => challenge,
        Challenge::Authentication(_) => {
            return Err(TiqrError::Config(ConfigError::ValidationError {
                message: "This is an authentication challenge; use 'tiqr login'".to_string(),
            }))
        }
    };

    let identity_name = challenge
        .identity
        .as_ref()
        .map(|i| i.display_name.as_str())
        .unwrap_or("(unnamed)");

    println!(
        "Enrolling {} with {}",
        identity_name.cyan(),
        challenge.provider.display_name.cyan()
    );

    if !prompt_yes_no("Continue?", true)? {
        println!("Enrollment cancelled.");
        return Ok(());
    }

    let pin = resolve_pin(pin, true)?;
    let cancel = cancel_on_interrupt();

    client
        .complete_challenge(&Challenge::Enrollment(challenge), &pin, &cancel)
        .await?;

    println!("✅ Identity enrolled.");
    Ok(())
}
