//! Challenge parsing through the client
//!
//! Authentication parsing is local; enrollment parsing fetches the
//! provider metadata document, mocked here with wiremock.

use std::sync::Arc;

use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tiqr_core::challenge::Challenge;
use tiqr_core::client::TiqrClient;
use tiqr_core::config::ClientConfig;
use tiqr_core::error::{ChallengeParseError, TiqrError};
use tiqr_core::identity::{Identity, IdentityProvider};
use tiqr_core::store::registry::Registry;
use tiqr_core::store::MemoryVault;

fn test_provider() -> IdentityProvider {
    IdentityProvider {
        identifier: "idp.test".to_string(),
        display_name: "Test Provider".to_string(),
        authentication_url: "https://idp.test/tiqr/auth".to_string(),
        ocra_suite: "OCRA-1:HOTP-SHA1-6:QN10".to_string(),
        info_url: None,
        logo_url: None,
    }
}

fn test_registry() -> Registry {
    let mut registry = Registry::default();
    registry.register_provider(test_provider());
    registry.insert_identity(Identity {
        identifier: "jdoe".to_string(),
        display_name: "John Doe".to_string(),
        provider: "idp.test".to_string(),
    });
    registry
}

fn client_with(registry: &Registry, config: ClientConfig) -> (TiqrClient, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let registry_path = dir.path().join("registry.toml");
    registry.save(&registry_path).unwrap();

    let client =
        TiqrClient::with_registry_path(config, Arc::new(MemoryVault::new()), registry_path)
            .unwrap();
    (client, dir)
}

fn metadata_document() -> String {
    r#"{
        "service": {
            "identifier": "enroll.test",
            "displayName": "Enrollment Provider",
            "authenticationUrl": "https://enroll.test/tiqr/auth",
            "enrollmentUrl": "https://enroll.test/tiqr/enroll?key=abc",
            "ocraSuite": "OCRA-1:HOTP-SHA1-6:QN10",
            "protocolVersion": "2"
        },
        "identity": {
            "identifier": "jdoe",
            "displayName": "John Doe"
        }
    }"#
    .to_string()
}

#[tokio::test]
async fn test_rejects_non_tiqr_schemes() {
    let (client, _dir) = client_with(&test_registry(), ClientConfig::default());

    let rejected = [
        "https://idp.test/sess/42",
        "otpauth://totp/x?secret=ABC",
        "tiqr://idp.test/sess/42",
        "TIQRAUTH://idp.test/sess/42",
        "random text",
    ];

    for raw in rejected {
        let result = client.parse_challenge(raw).await;
        assert!(
            matches!(
                result,
                Err(TiqrError::Parse(ChallengeParseError::InvalidScheme))
            ),
            "accepted {:?}",
            raw
        );
    }
}

#[tokio::test]
async fn test_authentication_round_trip() {
    let (client, _dir) = client_with(&test_registry(), ClientConfig::default());

    let challenge = client
        .parse_challenge("tiqrauth://jdoe@idp.test/sess-1/0012345678/Wiki/wiki.test/2")
        .await
        .unwrap();

    let Challenge::Authentication(challenge) = challenge else {
        panic!("expected an authentication challenge");
    };

    assert_eq!(challenge.session_key, "sess-1");
    assert_eq!(challenge.challenge, "0012345678");
    assert_eq!(challenge.service_provider_display_name, "Wiki");
    assert_eq!(challenge.service_provider_identifier, "wiki.test");
    assert_eq!(challenge.protocol_version.as_deref(), Some("2"));
    assert!(challenge.is_step_up);
    assert_eq!(challenge.provider, test_provider());
    assert_eq!(challenge.identity.unwrap().identifier, "jdoe");
}

#[tokio::test]
async fn test_authentication_unknown_provider() {
    let (client, _dir) = client_with(&test_registry(), ClientConfig::default());

    let result = client
        .parse_challenge("tiqrauth://stranger.test/sess-1/42")
        .await;

    assert!(matches!(
        result,
        Err(TiqrError::Parse(ChallengeParseError::UnknownProvider { identifier })) if identifier == "stranger.test"
    ));
}

#[tokio::test]
async fn test_enrollment_round_trip() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tiqr/metadata"))
        .respond_with(ResponseTemplate::new(200).set_body_string(metadata_document()))
        .mount(&server)
        .await;

    let (client, _dir) = client_with(&Registry::default(), ClientConfig::default());

    let raw = format!("tiqrenroll://{}/tiqr/metadata", server.uri());
    let challenge = client.parse_challenge(&raw).await.unwrap();

    let Challenge::Enrollment(challenge) = challenge else {
        panic!("expected an enrollment challenge");
    };

    assert_eq!(challenge.provider.identifier, "enroll.test");
    assert_eq!(challenge.provider.display_name, "Enrollment Provider");
    assert_eq!(
        challenge.enrollment_url,
        "https://enroll.test/tiqr/enroll?key=abc"
    );
    assert_eq!(challenge.protocol_version.as_deref(), Some("2"));

    let identity = challenge.identity.unwrap();
    assert_eq!(identity.identifier, "jdoe");
    assert_eq!(identity.provider, "enroll.test");
}

#[tokio::test]
async fn test_enrollment_metadata_not_served() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tiqr/metadata"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let (client, _dir) = client_with(&Registry::default(), ClientConfig::default());

    let raw = format!("tiqrenroll://{}/tiqr/metadata", server.uri());
    let result = client.parse_challenge(&raw).await;

    assert!(matches!(
        result,
        Err(TiqrError::Parse(ChallengeParseError::UnknownProvider { .. }))
    ));
}

#[tokio::test]
async fn test_enrollment_metadata_undecodable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tiqr/metadata"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let (client, _dir) = client_with(&Registry::default(), ClientConfig::default());

    let raw = format!("tiqrenroll://{}/tiqr/metadata", server.uri());
    let result = client.parse_challenge(&raw).await;

    assert!(matches!(
        result,
        Err(TiqrError::Parse(ChallengeParseError::MalformedChallenge { .. }))
    ));
}

#[tokio::test]
async fn test_enrollment_version_gate() {
    let server = MockServer::start().await;

    let document = metadata_document().replace("\"protocolVersion\": \"2\"", "\"protocolVersion\": \"3\"");
    Mock::given(method("GET"))
        .and(path("/tiqr/metadata"))
        .respond_with(ResponseTemplate::new(200).set_body_string(document))
        .mount(&server)
        .await;

    let raw = format!("tiqrenroll://{}/tiqr/metadata", server.uri());

    // Compatibility mode on (the default) accepts the newer provider
    let (client, _dir) = client_with(&Registry::default(), ClientConfig::default());
    assert!(client.parse_challenge(&raw).await.is_ok());

    // Strict mode rejects it
    let strict = ClientConfig {
        protocol_compatibility_mode: false,
        ..ClientConfig::default()
    };
    let (client, _dir) = client_with(&Registry::default(), strict);
    let result = client.parse_challenge(&raw).await;

    assert!(matches!(
        result,
        Err(TiqrError::Parse(ChallengeParseError::UnsupportedVersion { declared })) if declared == "3"
    ));
}

#[tokio::test]
async fn test_parse_mutates_nothing() {
    let (client, dir) = client_with(&test_registry(), ClientConfig::default());
    let registry_path = dir.path().join("registry.toml");
    let before = std::fs::read_to_string(&registry_path).unwrap();

    let _ = client
        .parse_challenge("tiqrauth://jdoe@idp.test/sess-1/42")
        .await
        .unwrap();
    let _ = client.parse_challenge("tiqrauth://stranger.test/s/1").await;

    let after = std::fs::read_to_string(&registry_path).unwrap();
    assert_eq!(before, after);
}
