//! Setup command implementation
//!
//! Interactive first-time configuration. Secrets never pass through
//! here; enrollment is what creates them.

use tiqr_core::config::{self, ClientConfig};
use tiqr_core::error::{ConfigError, Result, TiqrError};

use crate::cli::{prompt_input, prompt_yes_no};

/// Run the setup command
pub fn run_setup() -> Result<()> {
    println!("🔐 tiqr Client Setup");
    println!("====================");
    println!();
    println!("Configuration will be saved to ~/.config/tiqr/config.toml");
    println!();

    // Check if already configured
    if let Ok(true) = config::config_exists() {
        println!("⚠️  Existing configuration detected.");
        if !prompt_yes_no("Overwrite existing setup? (y/N)", false)? {
            println!("Setup cancelled.");
            return Ok(());
        }
        println!();
    }

    let protocol_compatibility_mode = prompt_yes_no(
        "Accept challenges from providers running a newer protocol?",
        true,
    )?;

    let request_timeout_secs: u64 = prompt_with_default("Request timeout in seconds", "10")?
        .parse()
        .map_err(|_| {
            TiqrError::Config(ConfigError::ValidationError {
                message: "Invalid timeout value".to_string(),
            })
        })?;

    let notification_type = prompt_with_default("Notification transport", "GCM")?;

    let config = ClientConfig {
        protocol_compatibility_mode,
        request_timeout_secs,
        notification_type,
    };
    config.validate()?;

    println!();
    println!("💾 Saving configuration...");
    config::save_config(&config)?;

    println!("✅ Setup complete!");
    println!();
    println!("You can now use:");
    println!("  tiqr scan <challenge>    - Inspect a scanned challenge");
    println!("  tiqr enroll <challenge>  - Enroll a new identity");
    println!("  tiqr login <challenge>   - Answer an authentication challenge");

    Ok(())
}

/// Prompt for a value with a default
fn prompt_with_default(prompt: &str, default: &str) -> Result<String> {
    let input = prompt_input(&format!("{} [{}]: ", prompt, default))?;

    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}
