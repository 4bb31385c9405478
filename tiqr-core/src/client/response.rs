//! Provider reply interpretation
//!
//! Protocol v2 providers answer completion submissions with a JSON
//! `responseCode` document; v1 providers answer with bare ASCII
//! tokens. Both map onto the same typed completion failures.

use serde::Deserialize;
use std::borrow::Cow;

use crate::error::ChallengeCompleteError;

/// Reply code signalling success
const RESPONSE_OK: i64 = 1;
/// Reply code for a malformed or replayed request
const RESPONSE_INVALID_REQUEST: i64 = 3;
/// Reply code for an expired or unknown challenge
const RESPONSE_INVALID_CHALLENGE: i64 = 4;
/// Reply code for a blocked account
const RESPONSE_ACCOUNT_BLOCKED: i64 = 5;
/// Reply code for an unknown user
const RESPONSE_INVALID_USER: i64 = 6;

/// Legacy v1 error token prefix whose separators must be rewritten
const LEGACY_ERROR_PREFIX: &str = "INVALID_RESPONSE:";

/// Structured v2 reply body
#[derive(Debug, Deserialize)]
struct ServerReply {
    #[serde(rename = "responseCode")]
    response_code: i64,

    #[serde(rename = "attemptsLeft", default)]
    attempts_left: Option<u64>,

    #[serde(default)]
    duration: Option<u64>,
}

/// Rewrite a legacy v1 error reply for structured parsing
///
/// v1 servers separate the `INVALID_RESPONSE` token from its attempt
/// count with the same `:` the token itself contains, which corrupts
/// downstream splitting. The rewrite triggers on the exact prefix only
/// and passes every other reply through unchanged; the server behavior
/// it compensates for predates this client, so the condition is kept
/// as-is.
pub fn normalize_legacy_response(raw: &str) -> Cow<'_, str> {
    if raw.starts_with(LEGACY_ERROR_PREFIX) {
        Cow::Owned(raw.replace(':', "|"))
    } else {
        Cow::Borrowed(raw)
    }
}

fn is_v2(protocol_version: Option<&str>) -> bool {
    protocol_version
        .and_then(|v| v.parse::<u32>().ok())
        .map_or(false, |v| v >= 2)
}

/// Interpret a provider's completion reply body
pub(crate) fn interpret_reply(
    body: &str,
    protocol_version: Option<&str>,
) -> Result<(), ChallengeCompleteError> {
    if is_v2(protocol_version) {
        interpret_v2_reply(body)
    } else {
        interpret_v1_reply(body)
    }
}

fn interpret_v2_reply(body: &str) -> Result<(), ChallengeCompleteError> {
    let Ok(reply) = serde_json::from_str::<ServerReply>(body) else {
        return Err(ChallengeCompleteError::InvalidResponse {
            attempts_left: None,
        });
    };

    match reply.response_code {
        RESPONSE_OK => Ok(()),
        RESPONSE_INVALID_REQUEST => Err(ChallengeCompleteError::InvalidRequest),
        RESPONSE_INVALID_CHALLENGE => Err(ChallengeCompleteError::InvalidChallenge),
        RESPONSE_ACCOUNT_BLOCKED => Err(ChallengeCompleteError::AccountBlocked {
            duration: reply.duration,
        }),
        RESPONSE_INVALID_USER => Err(ChallengeCompleteError::InvalidUser),
        // Code 2 (rejected response), and any code a newer server might add
        _ => Err(ChallengeCompleteError::InvalidResponse {
            attempts_left: reply.attempts_left,
        }),
    }
}

fn interpret_v1_reply(body: &str) -> Result<(), ChallengeCompleteError> {
    let trimmed = body.trim();

    if trimmed == "OK" {
        return Ok(());
    }

    let normalized = normalize_legacy_response(trimmed);
    let mut parts = normalized.split('|');

    match parts.next() {
        Some("INVALID_RESPONSE") => Err(ChallengeCompleteError::InvalidResponse {
            attempts_left: parts.next().and_then(|n| n.parse().ok()),
        }),
        Some("ACCOUNT_BLOCKED") => Err(ChallengeCompleteError::AccountBlocked { duration: None }),
        Some("INVALID_CHALLENGE") => Err(ChallengeCompleteError::InvalidChallenge),
        Some("INVALID_REQUEST") => Err(ChallengeCompleteError::InvalidRequest),
        Some("INVALID_USER") | Some("INVALID_USERID") => Err(ChallengeCompleteError::InvalidUser),
        _ => Err(ChallengeCompleteError::InvalidResponse {
            attempts_left: None,
        }),
    }
}
