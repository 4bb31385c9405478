//! Typed challenge model
//!
//! A scanned or deep-linked challenge string parses into one of two
//! variants: an enrollment challenge (register a new identity with a
//! provider) or an authentication challenge (prove possession of an
//! enrolled identity's secret). Challenges are transient, one per scan,
//! and are only ever constructed by the parser.

use crate::identity::{Identity, IdentityProvider};

pub mod metadata;
pub mod parse;

/// A validated challenge, ready for user confirmation and completion
#[derive(Debug, Clone)]
pub enum Challenge {
    Enrollment(EnrollmentChallenge),
    Authentication(AuthenticationChallenge),
}

/// Request to enroll a new identity with a provider
#[derive(Debug, Clone)]
pub struct EnrollmentChallenge {
    /// Protocol version declared by the provider metadata, if any
    pub protocol_version: Option<String>,

    /// Provider described by the fetched metadata
    pub provider: IdentityProvider,

    /// Identity proposed by the provider; not yet enrolled locally
    pub identity: Option<Identity>,

    /// URL to redirect to after completion, if the challenge carried one
    pub return_url: Option<String>,

    /// Endpoint the enrollment confirmation is submitted to
    pub enrollment_url: String,
}

/// Request to authenticate an enrolled identity to a service provider
#[derive(Debug, Clone)]
pub struct AuthenticationChallenge {
    /// Protocol version declared in the challenge, if any
    pub protocol_version: Option<String>,

    /// Locally registered provider the challenge names
    pub provider: IdentityProvider,

    /// Resolved local identity; `None` when several identities match
    /// and the host must pick one before completion
    pub identity: Option<Identity>,

    /// URL to redirect to after completion, if the challenge carried one
    pub return_url: Option<String>,

    /// Server-side session this authentication belongs to
    pub session_key: String,

    /// Challenge nonce; the numeric question the response is computed over
    pub challenge: String,

    /// Display name of the service requesting authentication
    pub service_provider_display_name: String,

    /// Identifier of the service requesting authentication
    pub service_provider_identifier: String,

    /// True when the challenge names a specific identity (step-up)
    pub is_step_up: bool,
}

impl Challenge {
    /// The identity provider this challenge belongs to
    pub fn provider(&self) -> &IdentityProvider {
        match self {
            Self::Enrollment(c) => &c.provider,
            Self::Authentication(c) => &c.provider,
        }
    }

    /// The resolved or proposed identity, if any
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Enrollment(c) => c.identity.as_ref(),
            Self::Authentication(c) => c.identity.as_ref(),
        }
    }

    /// Protocol version declared by the challenge, if any
    pub fn protocol_version(&self) -> Option<&str> {
        match self {
            Self::Enrollment(c) => c.protocol_version.as_deref(),
            Self::Authentication(c) => c.protocol_version.as_deref(),
        }
    }

    /// Post-completion redirect target, if any
    pub fn return_url(&self) -> Option<&str> {
        match self {
            Self::Enrollment(c) => c.return_url.as_deref(),
            Self::Authentication(c) => c.return_url.as_deref(),
        }
    }
}
