use libreg::{Config, Credentials, Reference, RegError, RegistryBuilder};

#[test]
fn test_version_is_set() {
    assert!(!libreg::version().is_empty());
}

#[test]
fn test_reference_feeds_registry_builder() {
    let reference: Reference = "alpine:3.19".parse().unwrap();

    let builder = RegistryBuilder::new(reference.domain());
    assert_eq!(builder.registry_url(), "https://registry-1.docker.io");
    assert_eq!(reference.path(), "library/alpine");
}

#[test]
fn test_builder_chaining() {
    let builder = RegistryBuilder::new("localhost:5000")
        .with_credentials(Credentials::basic("user", "pass"))
        .insecure(true)
        .force_non_ssl(true)
        .skip_ping(true)
        .timeout(5);

    assert_eq!(builder.registry_url(), "http://localhost:5000");
}

#[test]
fn test_invalid_reference_is_validation_error() {
    let result = "UPPER/case".parse::<Reference>();
    assert!(matches!(result, Err(RegError::Validation { .. })));
}

#[test]
fn test_default_config() {
    assert_eq!(Config::default().network.timeout, 30);
}

#[tokio::test]
async fn test_tags_against_mock_registry() {
    let mut server = mockito::Server::new_async().await;
    let _ping = server
        .mock("GET", "/v2/")
        .with_status(200)
        .create_async()
        .await;
    let _tags = server
        .mock("GET", "/v2/team/app/tags/list")
        .with_status(200)
        .with_body(r#"{"name":"team/app","tags":["v2","v1"]}"#)
        .create_async()
        .await;

    let registry = RegistryBuilder::new(server.url()).build().await.unwrap();
    let tags = registry.tags("team/app").await.unwrap();

    assert_eq!(tags, vec!["v2", "v1"]);
}
