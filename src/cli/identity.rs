//! Identity management commands
//!
//! Lists enrolled identities and removes them (registry record and
//! vault entry together).

use colored::Colorize;
use tiqr_core::error::Result;

use crate::cli::{build_client, prompt_yes_no};

/// Run the identity list command
pub fn run_list() -> Result<()> {
    let client = build_client()?;
    let registry = client.registry()?;

    if registry.identities.is_empty() {
        println!("No identities enrolled.");
        return Ok(());
    }

    for identity in &registry.identities {
        let provider_name = registry
            .provider_by_id(&identity.provider)
            .map(|p| p.display_name.as_str())
            .unwrap_or(identity.provider.as_str());

        println!(
            "{} ({}) at {}",
            identity.display_name.cyan(),
            identity.identifier,
            provider_name
        );
    }

    Ok(())
}

/// Run the identity remove command
pub fn run_remove(identifier: &str, provider: &str) -> Result<()> {
    let prompt = format!("Remove identity '{}' and its secret?", identifier);
    if !prompt_yes_no(&prompt, false)? {
        println!("Removal cancelled.");
        return Ok(());
    }

    let client = build_client()?;

    if client.remove_identity(identifier, provider)? {
        println!("✅ Identity removed.");
    } else {
        println!("No such identity: {} at {}", identifier, provider);
    }

    Ok(())
}
