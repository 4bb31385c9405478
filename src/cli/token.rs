//! Token command implementation
//!
//! Hands a push notification device token to the client, which
//! persists it in the device registration state for subsequent
//! completions to advertise.

use tiqr_core::error::Result;

use crate::cli::build_client;

/// Run the token command
pub fn run_token(token: &str) -> Result<()> {
    let client = build_client()?;
    client.on_new_device_token(token)?;

    println!("✅ Device token registered.");
    Ok(())
}
