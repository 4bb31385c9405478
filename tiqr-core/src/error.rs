//! Error types for the tiqr client core
//!
//! This module defines all error types used throughout the library,
//! providing consistent error handling and user-friendly error messages.

use thiserror::Error;

/// Main error type for the tiqr client
#[derive(Error, Debug)]
pub enum TiqrError {
    /// Errors raised while parsing/validating a scanned challenge
    #[error("Challenge error: {0}")]
    Parse(#[from] ChallengeParseError),

    /// Errors raised while completing a challenge against the provider
    #[error("Completion error: {0}")]
    Complete(#[from] ChallengeCompleteError),

    /// Errors related to OTP computation
    #[error("OTP error: {0}")]
    Otp(#[from] OtpError),

    /// Errors related to the secret vault
    #[error("Vault error: {0}")]
    Vault(#[from] VaultError),

    /// Errors related to configuration and registry persistence
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing errors
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Challenge parse/validation errors
///
/// All variants are recoverable (the user rescans) and carry a
/// displayable title/message pair for the host UI.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChallengeParseError {
    #[error("Challenge does not start with a tiqr scheme")]
    InvalidScheme,

    #[error("{message}")]
    MalformedChallenge { title: String, message: String },

    #[error("Unknown identity provider: {identifier}")]
    UnknownProvider { identifier: String },

    #[error("No enrolled identity matches this challenge: {identifier}")]
    UnknownIdentity { identifier: String },

    #[error("Challenge requires protocol version {declared}, which is not supported")]
    UnsupportedVersion { declared: String },
}

impl ChallengeParseError {
    /// Short displayable title for the host UI
    pub fn title(&self) -> &str {
        match self {
            Self::InvalidScheme => "Invalid challenge",
            Self::MalformedChallenge { title, .. } => title,
            Self::UnknownProvider { .. } => "Unknown provider",
            Self::UnknownIdentity { .. } => "Unknown identity",
            Self::UnsupportedVersion { .. } => "Update required",
        }
    }

    /// Displayable message for the host UI
    pub fn message(&self) -> String {
        match self {
            Self::MalformedChallenge { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Challenge completion errors
///
/// Surfaced to the host after a completion attempt. Only
/// `ConnectionError` is plausibly retryable by re-invoking completion.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChallengeCompleteError {
    #[error("Wrong PIN")]
    InvalidPin,

    #[error("Account is blocked")]
    AccountBlocked { duration: Option<u64> },

    #[error("Provider rejected the response")]
    InvalidResponse { attempts_left: Option<u64> },

    #[error("Provider rejected the challenge")]
    InvalidChallenge,

    #[error("Provider rejected the request")]
    InvalidRequest,

    #[error("Provider does not know this identity")]
    InvalidUser,

    #[error("Connection error: {reason}")]
    ConnectionError { reason: String },

    #[error("Completion was cancelled")]
    Cancelled,
}

/// OTP computation errors
///
/// These indicate a broken runtime environment or corrupted enrollment
/// data rather than user error, and propagate as unrecoverable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OtpError {
    #[error("OTP secret is empty or malformed")]
    InvalidKey,

    #[error("Unsupported OCRA suite: {suite}")]
    UnsupportedAlgorithm { suite: String },

    #[error("Unsupported OTP length: {digits}")]
    InvalidDigits { digits: usize },

    #[error("Challenge nonce is not a valid numeric question: {nonce}")]
    InvalidChallengeNonce { nonce: String },

    #[error("Invalid PIN format: must be exactly 4 numeric digits")]
    InvalidPinFormat,
}

/// Secret vault operation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VaultError {
    #[error("Secret vault unavailable")]
    ServiceUnavailable,

    #[error("Failed to store secret in vault")]
    StoreFailed,

    #[error("Failed to delete secret from vault")]
    DeleteFailed,

    #[error("Secret not found in vault")]
    NotFound,

    #[error("Wrong PIN")]
    InvalidPin,

    #[error("Stored secret has an invalid format")]
    InvalidFormat,
}

/// Configuration and registry persistence errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to load file: {path}")]
    LoadFailed { path: String },

    #[error("Failed to save file: {path}")]
    SaveFailed { path: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("I/O error: {message}")]
    IoError { message: String },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, TiqrError>;
