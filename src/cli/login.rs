//! Login command implementation
//!
//! Answers an authentication challenge: resolves the identity, asks
//! for the PIN, and submits the one-time response to the provider.

use colored::Colorize;
use tiqr_core::challenge::Challenge;
use tiqr_core::error::{ChallengeCompleteError, ConfigError, Result, TiqrError};

use crate::cli::{build_client, cancel_on_interrupt, prompt_input, resolve_pin};

/// Run the login command
pub async fn run_login(raw: &str, pin: Option<String>) -> Result<()> {
    let client = build_client()?;

    let mut challenge = match client.parse_challenge(raw).await? {
        Challenge::Authentication(challenge) => challenge,
        Challenge::Enrollment(_) => {
            return Err(TiqrError::Config(ConfigError::ValidationError {
                message: "This is an enrollment challenge; use 'tiqr enroll'".to_string(),
            }))
        }
    };

    // Several identities enrolled with this provider: have the user pick
    if challenge.identity.is_none() {
        let registry = client.registry()?;
        let enrolled = registry.identities_for_provider(&challenge.provider.identifier);

        println!("Several identities are enrolled with this provider:");
        for (index, identity) in enrolled.iter().enumerate() {
            println!(
                "  [{}] {} ({})",
                index + 1,
                identity.display_name,
                identity.identifier
            );
        }

        let picked = loop {
            let input = prompt_input("Identity number: ")?;
            match input.parse::<usize>() {
                Ok(number) if (1..=enrolled.len()).contains(&number) => break number - 1,
                _ => println!("Please enter a number between 1 and {}.", enrolled.len()),
            }
        };

        challenge.identity = Some(enrolled[picked].clone());
    }

    println!(
        "Logging in to {} as {}",
        challenge.service_provider_display_name.cyan(),
        challenge
            .identity
            .as_ref()
            .map(|i| i.display_name.as_str())
            .unwrap_or_default()
            .cyan()
    );

    let pin = resolve_pin(pin, false)?;
    let cancel = cancel_on_interrupt();

    let result = client
        .complete_challenge(&Challenge::Authentication(challenge), &pin, &cancel)
        .await;

    match result {
        Ok(()) => {
            println!("✅ Login confirmed.");
            Ok(())
        }
        Err(TiqrError::Complete(ChallengeCompleteError::InvalidResponse {
            attempts_left: Some(attempts),
        })) => {
            eprintln!("Provider rejected the response; {} attempts left.", attempts);
            Err(TiqrError::Complete(ChallengeCompleteError::InvalidResponse {
                attempts_left: Some(attempts),
            }))
        }
        Err(other) => Err(other),
    }
}
