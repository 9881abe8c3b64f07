//! Registry operations module.
//!
//! [`Registry`] ties a configured [`Client`] to one registry host and offers
//! the operations the tags listing is built on. [`RegistryBuilder`] turns a
//! domain plus connection options into a ready, pinged `Registry`.

use crate::auth::Credentials;
use crate::client::{Client, ClientConfig, RegistryVersion};
use crate::error::{RegError, Result};
use crate::oci::{self, ImageManifest, ManifestOrIndex};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

#[cfg(test)]
mod tests;

/// Accept header for single-platform manifests, Docker v2 schema 2 first.
const MANIFEST_V2_ACCEPT: &str = "application/vnd.docker.distribution.manifest.v2+json, \
                                  application/vnd.oci.image.manifest.v1+json";

const DOCKER_HUB_DOMAINS: [&str; 2] = ["docker.io", "index.docker.io"];
const DOCKER_HUB_REGISTRY: &str = "registry-1.docker.io";

/// Read access to the tags of a repository and the metadata behind them.
///
/// Implemented by [`Registry`]; command code depends on this trait so it can
/// run against an in-memory source in tests.
#[allow(async_fn_in_trait)]
pub trait TagSource {
    /// All tag names of a repository, in registry order.
    async fn list_tags(&self, repository: &str) -> Result<Vec<String>>;

    /// The single-platform manifest a tag points at.
    async fn manifest_v2(&self, repository: &str, tag: &str) -> Result<ImageManifest>;

    /// Creation time recorded in the tag's image config, if any.
    async fn tag_created_date(
        &self,
        repository: &str,
        tag: &str,
    ) -> Result<Option<DateTime<Utc>>>;
}

/// A connection to one registry host.
pub struct Registry {
    /// HTTP client for registry communication.
    client: Client,
    /// Domain as given by the user, before Docker Hub mapping.
    domain: String,
    /// Config digests of manifests already fetched, keyed by `repository:tag`.
    config_digests: Mutex<HashMap<String, String>>,
}

impl Registry {
    /// Creates a new `Registry` from a configured client.
    ///
    /// # Examples
    ///
    /// ```
    /// use libreg::client::Client;
    /// use libreg::registry::Registry;
    ///
    /// let client = Client::new("http://localhost:5000", None).unwrap();
    /// let registry = Registry::new(client, "localhost:5000");
    /// assert_eq!(registry.domain(), "localhost:5000");
    /// ```
    pub fn new(client: Client, domain: impl Into<String>) -> Self {
        Self {
            client,
            domain: domain.into(),
            config_digests: Mutex::new(HashMap::new()),
        }
    }

    /// Returns a builder for the given registry domain.
    pub fn builder(domain: impl Into<String>) -> RegistryBuilder {
        RegistryBuilder::new(domain)
    }

    /// The registry domain this instance was created for.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Base URL requests are sent to.
    pub fn url(&self) -> &str {
        self.client.registry_url()
    }

    /// Checks that the registry serves the v2 API.
    pub async fn ping(&self) -> Result<RegistryVersion> {
        self.client.check_version().await
    }

    /// Lists all tags for a repository.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use libreg::registry::Registry;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let registry = Registry::builder("ghcr.io").build().await?;
    /// for tag in registry.tags("owner/app").await? {
    ///     println!("{}", tag);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn tags(&self, repository: &str) -> Result<Vec<String>> {
        self.client.fetch_tags(repository).await
    }

    /// Fetches the single-platform manifest for a tag.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the tag resolves to an image index or
    /// manifest list, in addition to any transport error.
    pub async fn manifest_v2(&self, repository: &str, tag: &str) -> Result<ImageManifest> {
        let (bytes, _digest) = self
            .client
            .fetch_manifest(repository, tag, MANIFEST_V2_ACCEPT)
            .await?;

        match ManifestOrIndex::from_bytes(&bytes)? {
            ManifestOrIndex::Manifest(manifest) => {
                self.config_digests
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .insert(
                        format!("{}:{}", repository, tag),
                        manifest.config().digest().to_string(),
                    );
                Ok(manifest)
            }
            ManifestOrIndex::Index(_) => Err(RegError::validation(format!(
                "{}:{} is an image index, not a single-platform manifest",
                repository, tag
            ))),
        }
    }

    /// Reads the creation time of a tag from its image config blob.
    ///
    /// Returns `Ok(None)` when the config carries no `created` field. The
    /// manifest is only fetched when [`Registry::manifest_v2`] has not already
    /// seen this tag.
    pub async fn tag_created_date(
        &self,
        repository: &str,
        tag: &str,
    ) -> Result<Option<DateTime<Utc>>> {
        let known = self
            .config_digests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&format!("{}:{}", repository, tag))
            .cloned();

        let config_digest = match known {
            Some(digest) => digest,
            None => {
                let manifest = self.manifest_v2(repository, tag).await?;
                manifest.config().digest().to_string()
            }
        };
        self.created_date_for_config(repository, &config_digest)
            .await
    }

    /// Reads `created` from the config blob with the given digest.
    pub(crate) async fn created_date_for_config(
        &self,
        repository: &str,
        config_digest: &str,
    ) -> Result<Option<DateTime<Utc>>> {
        let blob = self.client.fetch_blob(repository, config_digest).await?;
        oci::created_date(&blob)
    }
}

impl TagSource for Registry {
    async fn list_tags(&self, repository: &str) -> Result<Vec<String>> {
        self.tags(repository).await
    }

    async fn manifest_v2(&self, repository: &str, tag: &str) -> Result<ImageManifest> {
        Registry::manifest_v2(self, repository, tag).await
    }

    async fn tag_created_date(
        &self,
        repository: &str,
        tag: &str,
    ) -> Result<Option<DateTime<Utc>>> {
        Registry::tag_created_date(self, repository, tag).await
    }
}

/// Builder for [`Registry`].
///
/// # Examples
///
/// ```no_run
/// use libreg::auth::Credentials;
/// use libreg::registry::RegistryBuilder;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let registry = RegistryBuilder::new("localhost:5000")
///     .force_non_ssl(true)
///     .with_credentials(Credentials::basic("user", "pass"))
///     .timeout(10)
///     .build()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RegistryBuilder {
    domain: String,
    credentials: Option<Credentials>,
    insecure: bool,
    force_non_ssl: bool,
    skip_ping: bool,
    timeout: u64,
}

impl RegistryBuilder {
    /// Create a new builder for a registry domain.
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            credentials: None,
            insecure: false,
            force_non_ssl: false,
            skip_ping: false,
            timeout: ClientConfig::default().timeout_seconds,
        }
    }

    /// Set credentials for authentication.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Accept invalid TLS certificates.
    pub fn insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    /// Talk plain HTTP instead of HTTPS.
    pub fn force_non_ssl(mut self, force_non_ssl: bool) -> Self {
        self.force_non_ssl = force_non_ssl;
        self
    }

    /// Skip the `/v2/` check in [`build`](Self::build).
    pub fn skip_ping(mut self, skip_ping: bool) -> Self {
        self.skip_ping = skip_ping;
        self
    }

    /// Per-request timeout in seconds.
    pub fn timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Base URL the client will use for this domain.
    ///
    /// A domain that already carries a scheme is used unchanged.
    pub fn registry_url(&self) -> String {
        let domain = self.domain.trim().trim_end_matches('/');

        if domain.starts_with("http://") || domain.starts_with("https://") {
            return domain.to_string();
        }

        let host = if DOCKER_HUB_DOMAINS.contains(&domain) {
            DOCKER_HUB_REGISTRY
        } else {
            domain
        };
        let scheme = if self.force_non_ssl { "http" } else { "https" };

        format!("{}://{}", scheme, host)
    }

    /// Build the `Registry`, pinging it unless told not to.
    ///
    /// # Errors
    ///
    /// Returns an error if the domain is empty, the HTTP client cannot be
    /// created, or the ping fails.
    pub async fn build(self) -> Result<Registry> {
        if self.domain.trim().is_empty() {
            return Err(RegError::validation("Registry domain is required"));
        }

        let config = ClientConfig::new()
            .with_timeout(self.timeout)
            .with_insecure(self.insecure);
        let client = Client::with_config(&self.registry_url(), config, self.credentials)?;
        let registry = Registry::new(client, self.domain);

        if !self.skip_ping {
            registry.ping().await?;
        }

        Ok(registry)
    }
}
