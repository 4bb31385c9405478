//! Enrollment metadata document
//!
//! An enrollment challenge points at a metadata URL; the provider
//! serves a JSON document there describing itself and the identity
//! being enrolled. The field names are fixed by the wire protocol.

use serde::{Deserialize, Serialize};

use crate::otp::ocra::DEFAULT_OCRA_SUITE;

/// Top-level enrollment metadata document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentMetadata {
    pub service: ServiceMetadata,
    pub identity: IdentityMetadata,
}

/// Provider description inside enrollment metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceMetadata {
    pub identifier: String,
    pub display_name: String,
    pub authentication_url: String,
    pub enrollment_url: String,

    #[serde(default = "default_ocra_suite")]
    pub ocra_suite: String,

    #[serde(default)]
    pub protocol_version: Option<String>,

    #[serde(default)]
    pub info_url: Option<String>,

    #[serde(default)]
    pub logo_url: Option<String>,
}

/// Identity proposed by the provider for enrollment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityMetadata {
    pub identifier: String,
    pub display_name: String,
}

fn default_ocra_suite() -> String {
    DEFAULT_OCRA_SUITE.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_full_document() {
        let document = r#"{
            "service": {
                "identifier": "idp.example.org",
                "displayName": "Example Org",
                "authenticationUrl": "https://idp.example.org/tiqr/auth",
                "enrollmentUrl": "https://idp.example.org/tiqr/enroll?key=abc",
                "ocraSuite": "OCRA-1:HOTP-SHA1-8:QN10",
                "protocolVersion": "2",
                "infoUrl": "https://idp.example.org/about",
                "logoUrl": "https://idp.example.org/logo.png"
            },
            "identity": {
                "identifier": "jdoe",
                "displayName": "John Doe"
            }
        }"#;

        let metadata: EnrollmentMetadata = serde_json::from_str(document).unwrap();

        assert_eq!(metadata.service.identifier, "idp.example.org");
        assert_eq!(metadata.service.ocra_suite, "OCRA-1:HOTP-SHA1-8:QN10");
        assert_eq!(metadata.service.protocol_version.as_deref(), Some("2"));
        assert_eq!(metadata.identity.identifier, "jdoe");
    }

    #[test]
    fn test_decode_minimal_document_defaults_suite() {
        let document = r#"{
            "service": {
                "identifier": "idp.example.org",
                "displayName": "Example Org",
                "authenticationUrl": "https://idp.example.org/tiqr/auth",
                "enrollmentUrl": "https://idp.example.org/tiqr/enroll"
            },
            "identity": {
                "identifier": "jdoe",
                "displayName": "John Doe"
            }
        }"#;

        let metadata: EnrollmentMetadata = serde_json::from_str(document).unwrap();

        assert_eq!(metadata.service.ocra_suite, DEFAULT_OCRA_SUITE);
        assert_eq!(metadata.service.protocol_version, None);
        assert_eq!(metadata.service.info_url, None);
    }

    #[test]
    fn test_decode_missing_required_field_fails() {
        let document = r#"{
            "service": { "identifier": "idp.example.org" },
            "identity": { "identifier": "jdoe", "displayName": "John Doe" }
        }"#;

        assert!(serde_json::from_str::<EnrollmentMetadata>(document).is_err());
    }
}
