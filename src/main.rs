//! tiqr - TIQR two-factor authentication CLI client
//!
//! A command-line client for the TIQR challenge-response protocol:
//! enroll identities with providers, answer authentication challenges,
//! and manage the local identity registry.

use clap::{Parser, Subcommand};
use tiqr_core::{error::TiqrError, init_logging};

mod cli;

#[derive(Parser)]
#[command(name = "tiqr")]
#[command(about = "TIQR challenge-response two-factor authentication client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure the client interactively
    Setup,
    /// Parse a challenge and show what it asks for
    Scan {
        /// Raw challenge string (tiqrenroll:// or tiqrauth://)
        challenge: String,
    },
    /// Enroll a new identity from an enrollment challenge
    Enroll {
        /// Raw tiqrenroll:// challenge string
        challenge: String,
        /// PIN to bind the new identity's secret to (prompted if omitted)
        #[arg(long)]
        pin: Option<String>,
    },
    /// Answer an authentication challenge
    Login {
        /// Raw tiqrauth:// challenge string
        challenge: String,
        /// PIN unlocking the identity's secret (prompted if omitted)
        #[arg(long)]
        pin: Option<String>,
    },
    /// Manage enrolled identities
    Identity {
        #[command(subcommand)]
        action: IdentityCommands,
    },
    /// Register a push notification device token
    Token {
        /// Device token handed out by the notification platform
        token: String,
    },
}

#[derive(Subcommand)]
enum IdentityCommands {
    /// List enrolled identities
    List,
    /// Remove an enrolled identity and its secret
    Remove {
        /// Identity identifier
        identifier: String,
        /// Provider the identity is enrolled with
        #[arg(long)]
        provider: String,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = init_logging() {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(2);
    }

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Setup => cli::setup::run_setup(),
        Commands::Scan { challenge } => cli::scan::run_scan(&challenge).await,
        Commands::Enroll { challenge, pin } => cli::enroll::run_enroll(&challenge, pin).await,
        Commands::Login { challenge, pin } => cli::login::run_login(&challenge, pin).await,
        Commands::Identity { action } => match action {
            IdentityCommands::List => cli::identity::run_list(),
            IdentityCommands::Remove {
                identifier,
                provider,
            } => cli::identity::run_remove(&identifier, &provider),
        },
        Commands::Token { token } => cli::token::run_token(&token),
    };

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            let exit_code = match &e {
                // Configuration/setup issues (exit code 2)
                TiqrError::Config(_) | TiqrError::Toml(_) | TiqrError::TomlSerialize(_) => 2,
                TiqrError::Vault(_) | TiqrError::Otp(_) => 2,
                // Runtime failures (exit code 1)
                TiqrError::Parse(_) | TiqrError::Complete(_) | TiqrError::Io(_) => 1,
            };

            match e {
                TiqrError::Parse(parse_error) => {
                    eprintln!("{}: {}", parse_error.title(), parse_error.message());
                }
                other => eprintln!("{}", other),
            }
            std::process::exit(exit_code);
        }
    }
}
