use super::*;

#[test]
fn test_credentials_anonymous_has_no_header() {
    assert_eq!(Credentials::Anonymous.to_header_value(), None);
}

#[test]
fn test_credentials_basic() {
    let creds = Credentials::basic("testuser", "testpass");
    match &creds {
        Credentials::Basic { username, password } => {
            assert_eq!(username, "testuser");
            assert_eq!(password, "testpass");
        }
        _ => panic!("Expected Basic credentials"),
    }

    // base64("testuser:testpass")
    let header = creds.to_header_value().unwrap();
    assert_eq!(header, "Basic dGVzdHVzZXI6dGVzdHBhc3M=");
}

#[test]
fn test_credentials_bearer() {
    let creds = Credentials::bearer("my_token");
    let header = creds.to_header_value().unwrap();
    assert_eq!(header, "Bearer my_token");
}

#[test]
fn test_credentials_identity_token_has_no_header() {
    let creds = Credentials::identity_token("refresh-abc");
    assert_eq!(creds.to_header_value(), None);
}

#[test]
fn test_auth_challenge_parse_bearer() {
    let header = r#"Bearer realm="https://auth.example.com/token",service="registry.example.com",scope="repository:alpine:pull""#;

    let challenge = AuthChallenge::parse(header).unwrap();
    assert_eq!(challenge.scheme, "Bearer");
    assert!(challenge.is_bearer());
    assert_eq!(challenge.realm, "https://auth.example.com/token");
    assert_eq!(challenge.service, Some("registry.example.com".to_string()));
    assert_eq!(challenge.scope, Some("repository:alpine:pull".to_string()));
}

#[test]
fn test_auth_challenge_parse_scope_with_comma() {
    let header = r#"Bearer realm="https://auth.example.com/token",service="registry",scope="repository:team/app:pull,push""#;

    let challenge = AuthChallenge::parse(header).unwrap();
    assert_eq!(
        challenge.scope,
        Some("repository:team/app:pull,push".to_string())
    );
    assert_eq!(challenge.service, Some("registry".to_string()));
}

#[test]
fn test_auth_challenge_parse_without_scope() {
    let header = r#"Bearer realm="https://auth.example.com/token",service="registry""#;

    let challenge = AuthChallenge::parse(header).unwrap();
    assert_eq!(challenge.realm, "https://auth.example.com/token");
    assert_eq!(challenge.service, Some("registry".to_string()));
    assert_eq!(challenge.scope, None);
}

#[test]
fn test_auth_challenge_parse_basic() {
    let header = r#"Basic realm="Registry Access""#;

    let challenge = AuthChallenge::parse(header).unwrap();
    assert_eq!(challenge.scheme, "Basic");
    assert!(!challenge.is_bearer());
    assert_eq!(challenge.realm, "Registry Access");
}

#[test]
fn test_auth_challenge_parse_missing_realm() {
    let header = r#"Bearer service="registry""#;
    assert!(AuthChallenge::parse(header).is_err());
}

#[test]
fn test_auth_challenge_parse_invalid_format() {
    assert!(AuthChallenge::parse("InvalidHeader").is_err());
}

#[test]
fn test_token_response_prefers_token_field() {
    let response: TokenResponse =
        serde_json::from_str(r#"{"token":"abc","access_token":"def"}"#).unwrap();
    assert_eq!(response.into_token(), Some("abc".to_string()));
}

#[test]
fn test_token_response_falls_back_to_access_token() {
    let response: TokenResponse =
        serde_json::from_str(r#"{"access_token":"def","expires_in":300}"#).unwrap();
    assert_eq!(response.into_token(), Some("def".to_string()));
}

#[test]
fn test_token_response_without_token() {
    let response: TokenResponse = serde_json::from_str(r#"{"token":""}"#).unwrap();
    assert_eq!(response.into_token(), None);
}
