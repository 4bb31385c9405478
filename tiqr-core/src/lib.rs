//! Core library for the tiqr client
//!
//! This crate provides the TIQR challenge-response protocol layer:
//! challenge parsing and validation, PIN-gated secret storage, and
//! OCRA/HOTP response code generation.

pub mod error;
pub mod identity;
pub mod types;

pub mod challenge;
pub mod client;
pub mod config;
pub mod otp;
pub mod store;

/// Initialize logging infrastructure
///
/// Sets up tracing output to stderr at INFO level. Hosts embedding the
/// library can install their own subscriber instead.
pub fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().pretty())
        .with(tracing_subscriber::filter::LevelFilter::INFO)
        .init();

    Ok(())
}
