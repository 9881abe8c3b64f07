use super::*;
use sha2::{Digest as Sha2Digest, Sha256};

fn sha256(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("sha256:{:x}", hasher.finalize())
}

fn manifest_json(config_digest: &str, config_size: usize) -> String {
    format!(
        r#"{{
            "schemaVersion": 2,
            "mediaType": "application/vnd.docker.distribution.manifest.v2+json",
            "config": {{
                "mediaType": "application/vnd.docker.container.image.v1+json",
                "size": {},
                "digest": "{}"
            }},
            "layers": [
                {{
                    "mediaType": "application/vnd.docker.image.rootfs.diff.tar.gzip",
                    "size": 10,
                    "digest": "sha256:9834876dcfb05cb167a5c24953eba58c4ac89b1adf57f28f2f9d09af107ee8f0"
                }}
            ]
        }}"#,
        config_size, config_digest
    )
}

async fn registry_for(server: &mockito::Server) -> Registry {
    Registry::builder(server.url())
        .skip_ping(true)
        .build()
        .await
        .unwrap()
}

#[test]
fn test_builder_maps_docker_hub() {
    assert_eq!(
        RegistryBuilder::new("docker.io").registry_url(),
        "https://registry-1.docker.io"
    );
    assert_eq!(
        RegistryBuilder::new("index.docker.io").registry_url(),
        "https://registry-1.docker.io"
    );
}

#[test]
fn test_builder_scheme_selection() {
    assert_eq!(
        RegistryBuilder::new("ghcr.io").registry_url(),
        "https://ghcr.io"
    );
    assert_eq!(
        RegistryBuilder::new("localhost:5000")
            .force_non_ssl(true)
            .registry_url(),
        "http://localhost:5000"
    );
    assert_eq!(
        RegistryBuilder::new("http://127.0.0.1:1234/").registry_url(),
        "http://127.0.0.1:1234"
    );
}

#[tokio::test]
async fn test_builder_empty_domain_fails() {
    let result = RegistryBuilder::new("  ").skip_ping(true).build().await;
    assert!(matches!(result, Err(RegError::Validation { .. })));
}

#[tokio::test]
async fn test_builder_pings_registry() {
    let mut server = mockito::Server::new_async().await;
    let ping = server
        .mock("GET", "/v2/")
        .with_status(200)
        .create_async()
        .await;

    let registry = Registry::builder(server.url()).build().await.unwrap();

    ping.assert_async().await;
    assert_eq!(registry.url(), server.url());
}

#[tokio::test]
async fn test_builder_ping_failure_aborts() {
    let mut server = mockito::Server::new_async().await;
    let _ping = server
        .mock("GET", "/v2/")
        .with_status(503)
        .create_async()
        .await;

    let result = Registry::builder(server.url()).build().await;
    assert!(matches!(result, Err(RegError::Server { .. })));
}

#[tokio::test]
async fn test_builder_skip_ping() {
    let mut server = mockito::Server::new_async().await;
    let ping = server
        .mock("GET", "/v2/")
        .with_status(200)
        .expect(0)
        .create_async()
        .await;

    let _registry = registry_for(&server).await;

    ping.assert_async().await;
}

#[tokio::test]
async fn test_registry_tags() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/v2/library/alpine/tags/list")
        .with_status(200)
        .with_body(r#"{"name":"library/alpine","tags":["3.19","latest"]}"#)
        .create_async()
        .await;

    let registry = registry_for(&server).await;
    let tags = registry.tags("library/alpine").await.unwrap();

    assert_eq!(tags, vec!["3.19", "latest"]);
}

#[tokio::test]
async fn test_manifest_v2_sends_accept_header() {
    let mut server = mockito::Server::new_async().await;
    let body = manifest_json(&sha256(b"{}"), 2);
    let mock = server
        .mock("GET", "/v2/app/manifests/v1")
        .match_header("Accept", MANIFEST_V2_ACCEPT)
        .with_status(200)
        .with_body(body)
        .create_async()
        .await;

    let registry = registry_for(&server).await;
    let manifest = registry.manifest_v2("app", "v1").await.unwrap();

    mock.assert_async().await;
    assert_eq!(manifest.layers().len(), 1);
    assert_eq!(oci::total_size(&manifest), 12);
}

#[tokio::test]
async fn test_manifest_v2_rejects_index() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/v2/app/manifests/multi")
        .with_status(200)
        .with_body(
            r#"{
                "schemaVersion": 2,
                "mediaType": "application/vnd.docker.distribution.manifest.list.v2+json",
                "manifests": []
            }"#,
        )
        .create_async()
        .await;

    let registry = registry_for(&server).await;
    let result = registry.manifest_v2("app", "multi").await;

    assert!(matches!(result, Err(RegError::Validation { .. })));
}

#[tokio::test]
async fn test_tag_created_date_reads_config_blob() {
    let mut server = mockito::Server::new_async().await;
    let config = br#"{"created":"2024-01-01T00:00:00Z","architecture":"amd64","os":"linux"}"#;
    let config_digest = sha256(config);

    let _manifest = server
        .mock("GET", "/v2/app/manifests/v1")
        .with_status(200)
        .with_body(manifest_json(&config_digest, config.len()))
        .create_async()
        .await;
    let blob = server
        .mock("GET", format!("/v2/app/blobs/{}", config_digest).as_str())
        .with_status(200)
        .with_body(config)
        .create_async()
        .await;

    let registry = registry_for(&server).await;
    let created = registry.tag_created_date("app", "v1").await.unwrap();

    blob.assert_async().await;
    assert_eq!(
        created.map(|c| c.to_rfc3339()),
        Some("2024-01-01T00:00:00+00:00".to_string())
    );
}

#[tokio::test]
async fn test_tag_created_date_reuses_fetched_manifest() {
    let mut server = mockito::Server::new_async().await;
    let config = br#"{"created":"2023-06-30T12:00:00Z"}"#;
    let config_digest = sha256(config);

    let manifest = server
        .mock("GET", "/v2/app/manifests/v1")
        .with_status(200)
        .with_body(manifest_json(&config_digest, config.len()))
        .expect(1)
        .create_async()
        .await;
    let blob = server
        .mock("GET", format!("/v2/app/blobs/{}", config_digest).as_str())
        .with_status(200)
        .with_body(config)
        .expect(1)
        .create_async()
        .await;

    let registry = registry_for(&server).await;
    registry.manifest_v2("app", "v1").await.unwrap();
    let created = registry.tag_created_date("app", "v1").await.unwrap();

    manifest.assert_async().await;
    blob.assert_async().await;
    assert!(created.is_some());
}

#[tokio::test]
async fn test_tag_created_date_absent() {
    let mut server = mockito::Server::new_async().await;
    let config = br#"{"architecture":"amd64","os":"linux"}"#;
    let config_digest = sha256(config);

    let _manifest = server
        .mock("GET", "/v2/app/manifests/v1")
        .with_status(200)
        .with_body(manifest_json(&config_digest, config.len()))
        .create_async()
        .await;
    let _blob = server
        .mock("GET", format!("/v2/app/blobs/{}", config_digest).as_str())
        .with_status(200)
        .with_body(config)
        .create_async()
        .await;

    let registry = registry_for(&server).await;
    assert!(registry.tag_created_date("app", "v1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_tag_source_delegates_to_registry() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/v2/app/tags/list")
        .with_status(200)
        .with_body(r#"{"name":"app","tags":["b","a"]}"#)
        .create_async()
        .await;

    let registry = registry_for(&server).await;

    async fn via_trait(source: &impl TagSource) -> Vec<String> {
        source.list_tags("app").await.unwrap()
    }
    assert_eq!(via_trait(&registry).await, vec!["b", "a"]);
}
