use super::*;
use std::str::FromStr;

#[test]
fn test_reference_from_valid_string_succeeds() {
    let reference = Reference::from_str("ghcr.io/user/repo:latest");
    assert!(reference.is_ok());
}

#[test]
fn test_reference_from_invalid_string_fails() {
    let reference = Reference::from_str("Invalid-Reference-With-Caps");
    assert!(reference.is_err());
    assert!(matches!(
        reference.unwrap_err(),
        RegError::Validation { .. }
    ));
}

#[test]
fn test_reference_error_mentions_input() {
    let err = Reference::from_str("UPPER/case").unwrap_err();
    assert!(err.to_string().contains("UPPER/case"));
}

#[test]
fn test_reference_with_uppercase_repository_fails() {
    let err = Reference::from_str("ghcr.io/User/repo:latest").unwrap_err();

    assert!(matches!(err, RegError::Validation { .. }));
    assert!(err.to_string().contains("must be lowercase"));
}

#[test]
fn test_reference_with_uppercase_tag_succeeds() {
    let reference = Reference::from_str("ghcr.io/user/repo:V1.0").unwrap();
    assert_eq!(reference.tag(), Some("V1.0"));
}

#[test]
fn test_reference_display_trait() {
    let valid_ref = "ghcr.io/user/repo:latest";
    let reference = Reference::from_str(valid_ref).unwrap();
    assert_eq!(reference.to_string(), valid_ref);
}

#[test]
fn test_reference_accessors() {
    let reference = Reference::from_str("ghcr.io/user/repo:latest").unwrap();
    assert_eq!(reference.domain(), "ghcr.io");
    assert_eq!(reference.path(), "user/repo");
    assert_eq!(reference.tag(), Some("latest"));
    assert_eq!(reference.digest(), None);
}

#[test]
fn test_reference_with_port_in_domain() {
    let reference = Reference::from_str("localhost:5000/team/app:v1").unwrap();
    assert_eq!(reference.domain(), "localhost:5000");
    assert_eq!(reference.path(), "team/app");
    assert_eq!(reference.tag(), Some("v1"));
}

#[test]
fn test_reference_short_name_resolves_to_docker_hub() {
    let reference = Reference::from_str("alpine").unwrap();
    assert_eq!(reference.domain(), "docker.io");
    assert_eq!(reference.path(), "library/alpine");
}

#[test]
fn test_reference_with_digest() {
    let digest = "sha256:7173b809ca12ec5dee4506cd86be934c4596dd234ee82c0662eac04a8c2c71dc";
    let reference = Reference::from_str(&format!("quay.io/org/tool@{}", digest)).unwrap();
    assert_eq!(reference.domain(), "quay.io");
    assert_eq!(reference.path(), "org/tool");
    assert_eq!(reference.digest(), Some(digest));
}
