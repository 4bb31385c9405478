//! Scan command implementation
//!
//! Parses a challenge string and prints what it asks for without
//! completing anything. Useful for inspecting QR payloads.

use colored::Colorize;
use tiqr_core::challenge::Challenge;
use tiqr_core::error::Result;

use crate::cli::build_client;

/// Run the scan command
pub async fn run_scan(raw: &str) -> Result<()> {
    let client = build_client()?;
    let challenge = client.parse_challenge(raw).await?;

    print_challenge(&challenge);
    Ok(())
}

/// Print a human-readable challenge summary
pub fn print_challenge(challenge: &Challenge) {
    match challenge {
        Challenge::Enrollment(c) => {
            println!("{}", "Enrollment challenge".bold());
            println!("  Provider:  {}", c.provider.display_name.cyan());
            if let Some(identity) = &c.identity {
                println!(
                    "  Identity:  {} ({})",
                    identity.display_name.cyan(),
                    identity.identifier
                );
            }
            println!("  Endpoint:  {}", c.enrollment_url);
        }
        Challenge::Authentication(c) => {
            println!("{}", "Authentication challenge".bold());
            println!(
                "  Service:   {} ({})",
                c.service_provider_display_name.cyan(),
                c.service_provider_identifier
            );
            println!("  Provider:  {}", c.provider.display_name.cyan());
            match &c.identity {
                Some(identity) => println!(
                    "  Identity:  {} ({})",
                    identity.display_name.cyan(),
                    identity.identifier
                ),
                None => println!("  Identity:  {}", "multiple enrolled, pick at login".yellow()),
            }
            if c.is_step_up {
                println!("  Step-up:   requested for a specific identity");
            }
        }
    }

    if let Some(version) = challenge.protocol_version() {
        println!("  Protocol:  v{}", version);
    }
    if let Some(return_url) = challenge.return_url() {
        println!("  Return to: {}", return_url);
    }
}
