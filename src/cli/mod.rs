//! CLI command implementations
//!
//! Shared plumbing for the subcommands: client construction against
//! the system keyring, interactive prompts, and Ctrl-C cancellation.

use std::io::{self, Write};
use std::sync::Arc;

use tiqr_core::client::TiqrClient;
use tiqr_core::config::{self, ClientConfig};
use tiqr_core::error::Result;
use tiqr_core::store::KeyringVault;
use tiqr_core::types::Pin;
use tokio_util::sync::CancellationToken;

pub mod enroll;
pub mod identity;
pub mod login;
pub mod scan;
pub mod setup;
pub mod token;

/// Build a client from the saved configuration, or defaults when the
/// user never ran `tiqr setup`
pub fn build_client() -> Result<TiqrClient> {
    let config = if config::config_exists()? {
        config::load_config()?
    } else {
        tracing::debug!("no configuration file, using defaults");
        ClientConfig::default()
    };

    TiqrClient::new(config, Arc::new(KeyringVault::new()))
}

/// A cancellation token tripped by Ctrl-C
///
/// Backing out of an in-flight completion must not leave the vault or
/// registry half-updated; the client guarantees that as long as the
/// token is the only cancellation path.
pub fn cancel_on_interrupt() -> CancellationToken {
    let token = CancellationToken::new();
    let tripped = token.clone();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tripped.cancel();
        }
    });

    token
}

/// Resolve the PIN from a flag or by prompting
pub fn resolve_pin(flag: Option<String>, confirm: bool) -> Result<Pin> {
    match flag {
        Some(pin) => Ok(Pin::new(pin)?),
        None => prompt_pin(confirm),
    }
}

/// Prompt for a 4-digit PIN, optionally asking twice to confirm
fn prompt_pin(confirm: bool) -> Result<Pin> {
    loop {
        let entered = prompt_input("PIN (4 digits): ")?;

        let pin = match Pin::new(entered) {
            Ok(pin) => pin,
            Err(_) => {
                println!("❌ The PIN must be exactly 4 digits. Please try again.");
                continue;
            }
        };

        if confirm {
            let again = prompt_input("Repeat PIN: ")?;
            if again != pin.expose() {
                println!("❌ PINs do not match. Please try again.");
                continue;
            }
        }

        return Ok(pin);
    }
}

/// Prompt for yes/no with default
pub fn prompt_yes_no(prompt: &str, default_yes: bool) -> Result<bool> {
    let default_indicator = if default_yes { "[Y/n]" } else { "[y/N]" };
    let prompt_text = format!("{} {}: ", prompt, default_indicator);

    loop {
        let input = prompt_input(&prompt_text)?.to_lowercase();

        match input.as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            "" => return Ok(default_yes),
            _ => {
                println!("Please enter 'y' for yes or 'n' for no.");
                continue;
            }
        }
    }
}

/// Low-level input prompting
pub fn prompt_input(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().to_string())
}
