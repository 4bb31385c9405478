//! Challenge parsing and validation
//!
//! Turns a raw scheme-prefixed string into a validated, typed
//! `Challenge`. Everything here is local and pure; the network half of
//! enrollment parsing (fetching provider metadata) lives on
//! `TiqrClient`, which feeds the fetched document back into
//! `build_enrollment`. Parsing never mutates persistent state.

use percent_encoding::percent_decode_str;
use url::Url;

use crate::challenge::metadata::EnrollmentMetadata;
use crate::challenge::{AuthenticationChallenge, EnrollmentChallenge};
use crate::config::SUPPORTED_PROTOCOL_VERSION;
use crate::error::ChallengeParseError;
use crate::identity::IdentityProvider;
use crate::store::registry::Registry;

/// Scheme prefix for authentication challenges
pub const AUTH_SCHEME: &str = "tiqrauth://";
/// Scheme prefix for enrollment challenges
pub const ENROLL_SCHEME: &str = "tiqrenroll://";

/// A raw challenge split by scheme, before any further validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RawChallenge<'a> {
    /// Full authentication challenge string, scheme included
    Authentication(&'a str),
    /// Metadata URL carried after the enrollment scheme
    Enrollment(&'a str),
}

/// Split a raw string by its tiqr scheme
pub(crate) fn split_scheme(raw: &str) -> Result<RawChallenge<'_>, ChallengeParseError> {
    if raw.starts_with(AUTH_SCHEME) {
        Ok(RawChallenge::Authentication(raw))
    } else if let Some(remainder) = raw.strip_prefix(ENROLL_SCHEME) {
        Ok(RawChallenge::Enrollment(remainder))
    } else {
        Err(ChallengeParseError::InvalidScheme)
    }
}

fn malformed(title: &str, message: impl Into<String>) -> ChallengeParseError {
    ChallengeParseError::MalformedChallenge {
        title: title.to_string(),
        message: message.into(),
    }
}

fn decode_segment(segment: &str) -> Result<String, ChallengeParseError> {
    percent_decode_str(segment)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|_| {
            malformed(
                "Invalid challenge",
                "The challenge contains invalid characters.",
            )
        })
}

/// Enforce the protocol version gate
///
/// A challenge declaring a version beyond what this client implements
/// is rejected unless compatibility mode is on.
pub(crate) fn check_protocol_version(
    declared: Option<&str>,
    compatibility_mode: bool,
) -> Result<(), ChallengeParseError> {
    let Some(declared) = declared else {
        // No declared version means protocol v1
        return Ok(());
    };

    if compatibility_mode {
        return Ok(());
    }

    match declared.parse::<u32>() {
        Ok(version) if version <= SUPPORTED_PROTOCOL_VERSION => Ok(()),
        _ => Err(ChallengeParseError::UnsupportedVersion {
            declared: declared.to_string(),
        }),
    }
}

/// Parse and validate an authentication challenge
///
/// Layout:
/// `tiqrauth://[user_id@]provider_id/session_key/challenge[/sp_display[/sp_identifier[/version]]]`
///
/// The provider must already be registered locally. A `user_id` marks a
/// step-up challenge and must resolve to an enrolled identity; without
/// one, a single enrolled identity under the provider resolves
/// implicitly and several leave the choice to the host.
pub(crate) fn parse_authentication(
    raw: &str,
    registry: &Registry,
    compatibility_mode: bool,
) -> Result<AuthenticationChallenge, ChallengeParseError> {
    let url = Url::parse(raw).map_err(|_| {
        malformed(
            "Invalid challenge",
            "The authentication challenge could not be read.",
        )
    })?;

    let provider_id = url
        .host_str()
        .ok_or_else(|| {
            malformed(
                "Invalid challenge",
                "The challenge does not name an identity provider.",
            )
        })?
        .to_string();

    let segments: Vec<String> = url
        .path_segments()
        .map(|segments| segments.map(decode_segment).collect::<Result<_, _>>())
        .transpose()?
        .unwrap_or_default();

    let segment = |index: usize| segments.get(index).filter(|s| !s.is_empty());

    let session_key = segment(0).cloned().ok_or_else(|| {
        malformed(
            "Invalid challenge",
            "The challenge is missing its session key.",
        )
    })?;

    let challenge = segment(1).cloned().ok_or_else(|| {
        malformed(
            "Invalid challenge",
            "The challenge is missing its verification nonce.",
        )
    })?;

    let protocol_version = segment(4).cloned();
    check_protocol_version(protocol_version.as_deref(), compatibility_mode)?;

    let provider = registry
        .provider_by_id(&provider_id)
        .cloned()
        .ok_or(ChallengeParseError::UnknownProvider {
            identifier: provider_id.clone(),
        })?;

    let user_id = match url.username() {
        "" => None,
        encoded => Some(decode_segment(encoded)?),
    };
    let is_step_up = user_id.is_some();

    let identity = match user_id {
        Some(user_id) => Some(
            registry
                .identity_by_id(&user_id, &provider_id)
                .cloned()
                .ok_or(ChallengeParseError::UnknownIdentity {
                    identifier: user_id,
                })?,
        ),
        None => {
            let mut enrolled = registry.identities_for_provider(&provider_id);
            match (enrolled.len(), enrolled.pop()) {
                (0, _) => {
                    return Err(ChallengeParseError::UnknownIdentity {
                        identifier: provider_id,
                    })
                }
                (1, only) => only.cloned(),
                // Several identities enrolled; the host picks one
                _ => None,
            }
        }
    };

    let return_url = url
        .query_pairs()
        .find(|(key, _)| key == "returnurl")
        .map(|(_, value)| value.into_owned());

    let service_provider_display_name = segment(2)
        .cloned()
        .unwrap_or_else(|| provider.display_name.clone());
    let service_provider_identifier = segment(3)
        .cloned()
        .unwrap_or_else(|| provider.identifier.clone());

    Ok(AuthenticationChallenge {
        protocol_version,
        provider,
        identity,
        return_url,
        session_key,
        challenge,
        service_provider_display_name,
        service_provider_identifier,
        is_step_up,
    })
}

/// Validate the metadata URL of an enrollment challenge
///
/// Returns the URL to fetch and the challenge's return URL, if the
/// metadata URL carried a `returnurl` query parameter.
pub(crate) fn validate_enrollment_url(
    remainder: &str,
) -> Result<(Url, Option<String>), ChallengeParseError> {
    let url = Url::parse(remainder).map_err(|_| {
        malformed(
            "Invalid enrollment",
            "The enrollment challenge does not carry a valid metadata URL.",
        )
    })?;

    match url.scheme() {
        "http" | "https" => {}
        _ => {
            return Err(malformed(
                "Invalid enrollment",
                "The enrollment metadata URL must use HTTP or HTTPS.",
            ))
        }
    }

    let return_url = url
        .query_pairs()
        .find(|(key, _)| key == "returnurl")
        .map(|(_, value)| value.into_owned());

    Ok((url, return_url))
}

/// Build an enrollment challenge from fetched provider metadata
pub(crate) fn build_enrollment(
    metadata: EnrollmentMetadata,
    return_url: Option<String>,
    compatibility_mode: bool,
) -> Result<EnrollmentChallenge, ChallengeParseError> {
    if metadata.service.enrollment_url.is_empty() {
        return Err(malformed(
            "Invalid enrollment",
            "The provider metadata does not carry an enrollment URL.",
        ));
    }

    if metadata.service.identifier.is_empty() {
        return Err(malformed(
            "Invalid enrollment",
            "The provider metadata does not identify the provider.",
        ));
    }

    let protocol_version = metadata.service.protocol_version.clone();
    check_protocol_version(protocol_version.as_deref(), compatibility_mode)?;

    let provider = IdentityProvider {
        identifier: metadata.service.identifier,
        display_name: metadata.service.display_name,
        authentication_url: metadata.service.authentication_url,
        ocra_suite: metadata.service.ocra_suite,
        info_url: metadata.service.info_url,
        logo_url: metadata.service.logo_url,
    };

    let identity = crate::identity::Identity {
        identifier: metadata.identity.identifier,
        display_name: metadata.identity.display_name,
        provider: provider.identifier.clone(),
    };

    Ok(EnrollmentChallenge {
        protocol_version,
        provider,
        identity: Some(identity),
        return_url,
        enrollment_url: metadata.service.enrollment_url,
    })
}
