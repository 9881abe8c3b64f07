//! HTTP client for OCI registry communication.
//!
//! A thin client built on reqwest that speaks the OCI Distribution v2 API.
//! Requests that come back `401` with a Bearer challenge are retried once
//! with a token from the challenge's realm; tokens are cached per scope.

use crate::auth::{AuthChallenge, Credentials, TokenResponse};
use crate::digest::Digest;
use crate::error::{RegError, Result};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, RETRY_AFTER, WWW_AUTHENTICATE};
use reqwest::{Client as ReqwestClient, Response, StatusCode};
use serde::Deserialize;
use sha2::{Digest as Sha2Digest, Sha256};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::Duration;


/// `client_id` sent with OAuth2 token requests.
const TOKEN_CLIENT_ID: &str = "reg";

/// Response from the tags list API endpoint.
#[derive(Debug, Deserialize)]
struct TagsResponse {
    /// Repository name
    name: String,
    /// List of tag names; some registries send `null` for an empty repository
    #[serde(default)]
    tags: Option<Vec<String>>,
}

/// Version information returned by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryVersion {
    /// The Docker-Distribution-API-Version header value, if present.
    /// Typically "registry/2.0" for OCI Distribution Spec v2.
    pub api_version: Option<String>,
}

/// Configuration for the HTTP client.
///
/// # Examples
///
/// ```
/// use libreg::client::ClientConfig;
///
/// let config = ClientConfig::new()
///     .with_timeout(60)
///     .with_max_idle_per_host(20);
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout in seconds (default: 30)
    pub timeout_seconds: u64,
    /// Maximum idle connections per host (default: 10)
    pub max_idle_per_host: usize,
    /// Accept invalid TLS certificates (default: false)
    pub insecure: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            max_idle_per_host: 10,
            insecure: false,
        }
    }
}

impl ClientConfig {
    /// Creates a new configuration with default values.
    ///
    /// # Examples
    ///
    /// ```
    /// use libreg::client::ClientConfig;
    ///
    /// let config = ClientConfig::new();
    /// assert_eq!(config.timeout_seconds, 30);
    /// assert_eq!(config.max_idle_per_host, 10);
    /// assert!(!config.insecure);
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the request timeout in seconds.
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Sets the maximum idle connections per host.
    pub fn with_max_idle_per_host(mut self, max: usize) -> Self {
        self.max_idle_per_host = max;
        self
    }

    /// Disables TLS certificate verification.
    pub fn with_insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }
}

/// HTTP client for OCI registry operations.
#[derive(Debug)]
pub struct Client {
    /// The underlying HTTP client
    http_client: ReqwestClient,
    /// Base registry URL (e.g., "https://registry.example.com")
    registry_url: String,
    /// Credentials presented to the registry or its token service
    credentials: Option<Credentials>,
    /// Used in timeout error messages
    timeout_seconds: u64,
    /// Bearer tokens keyed by scope
    tokens: Mutex<HashMap<String, String>>,
}

impl Client {
    /// Creates a new client for the specified registry URL with default configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use libreg::client::Client;
    ///
    /// let client = Client::new("http://localhost:5000", None).unwrap();
    /// assert_eq!(client.registry_url(), "http://localhost:5000");
    /// ```
    pub fn new(registry_url: &str, credentials: Option<Credentials>) -> Result<Self> {
        Self::with_config(registry_url, ClientConfig::default(), credentials)
    }

    /// Creates a new client for the specified registry URL with custom configuration.
    pub fn with_config(
        registry_url: &str,
        config: ClientConfig,
        credentials: Option<Credentials>,
    ) -> Result<Self> {
        let normalized_url = Self::normalize_url(registry_url)?;

        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .pool_max_idle_per_host(config.max_idle_per_host)
            .danger_accept_invalid_certs(config.insecure)
            .build()
            .map_err(|e| RegError::network_with_source("Failed to create HTTP client", e))?;

        Ok(Self {
            http_client,
            registry_url: normalized_url,
            credentials,
            timeout_seconds: config.timeout_seconds,
            tokens: Mutex::new(HashMap::new()),
        })
    }

    /// Normalizes a registry URL by ensuring it has a scheme and removing trailing slashes.
    fn normalize_url(url: &str) -> Result<String> {
        let url = url.trim();

        if url.is_empty() {
            return Err(RegError::validation("Registry URL cannot be empty"));
        }

        let url = if !url.starts_with("http://") && !url.starts_with("https://") {
            format!("http://{}", url)
        } else {
            url.to_string()
        };

        Ok(url.trim_end_matches('/').to_string())
    }

    /// Returns the base registry URL.
    pub fn registry_url(&self) -> &str {
        &self.registry_url
    }

    /// Checks that the registry answers the `/v2/` endpoint.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use libreg::client::Client;
    ///
    /// # async fn example() -> libreg::error::Result<()> {
    /// let client = Client::new("http://localhost:5000", None)?;
    /// let version = client.check_version().await?;
    /// if let Some(api_version) = version.api_version {
    ///     println!("Registry API version: {}", api_version);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the registry is unreachable, rejects the
    /// credentials, or does not serve the v2 API.
    pub async fn check_version(&self) -> Result<RegistryVersion> {
        let url = format!("{}/v2/", self.registry_url);
        let response = self.get(&url, None, None).await?;

        let api_version = response
            .headers()
            .get("Docker-Distribution-API-Version")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        self.check_response_status(response).await?;

        Ok(RegistryVersion { api_version })
    }

    /// Fetches every tag of a repository, following pagination links.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry is unreachable, the repository does
    /// not exist, access is denied, or the response is not valid JSON.
    pub async fn fetch_tags(&self, repository: &str) -> Result<Vec<String>> {
        self.fetch_tags_paginated(repository, None).await
    }

    /// Fetches the list of tags with an optional page size.
    ///
    /// With `limit` set, each request asks for at most `n` tags; pages are
    /// still followed until the registry stops sending a `Link` header.
    pub async fn fetch_tags_paginated(
        &self,
        repository: &str,
        limit: Option<usize>,
    ) -> Result<Vec<String>> {
        let scope = pull_scope(repository);
        let mut all_tags = Vec::new();
        let mut url = format!("{}/v2/{}/tags/list", self.registry_url, repository);

        if let Some(n) = limit {
            url.push_str(&format!("?n={}", n));
        }

        loop {
            let response = self.get(&url, Some(&scope), None).await?;

            // Extract Link header for pagination before consuming response
            let next_link = Self::extract_next_link(response.headers());

            let response = self.check_response_status(response).await?;

            let tags_response: TagsResponse = response.json().await.map_err(|e| {
                RegError::validation_with_source("Failed to parse tags response", e)
            })?;

            if tags_response.name != repository {
                return Err(RegError::validation(format!(
                    "Registry returned tags for '{}' but expected '{}'",
                    tags_response.name, repository
                )));
            }

            all_tags.extend(tags_response.tags.unwrap_or_default());

            match next_link {
                Some(link) if link.starts_with("http://") || link.starts_with("https://") => {
                    url = link;
                }
                Some(path) => url = format!("{}{}", self.registry_url, path),
                None => break,
            }
        }

        Ok(all_tags)
    }

    /// Fetches a manifest by tag or digest.
    ///
    /// `accept` is sent verbatim as the `Accept` header, which lets the
    /// caller pick between image manifests and indexes.
    ///
    /// # Returns
    ///
    /// The raw manifest bytes and the `Docker-Content-Digest` header, if the
    /// registry sent one.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry is unreachable, the reference does
    /// not exist, or access is denied.
    pub async fn fetch_manifest(
        &self,
        repository: &str,
        reference: &str,
        accept: &str,
    ) -> Result<(Vec<u8>, Option<String>)> {
        let url = format!(
            "{}/v2/{}/manifests/{}",
            self.registry_url, repository, reference
        );

        let response = self
            .get(&url, Some(&pull_scope(repository)), Some(accept))
            .await?;

        let digest = response
            .headers()
            .get("Docker-Content-Digest")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let response = self.check_response_status(response).await?;

        let manifest_bytes = response
            .bytes()
            .await
            .map_err(|e| RegError::network_with_source("Failed to read manifest response", e))?;

        Ok((manifest_bytes.to_vec(), digest))
    }

    /// Fetches a blob (layer or config) and verifies it against its digest.
    ///
    /// Redirects to storage backends are followed by reqwest.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob does not exist, the digest is malformed
    /// or not sha256, or the downloaded content does not match.
    pub async fn fetch_blob(&self, repository: &str, digest: &str) -> Result<Vec<u8>> {
        let expected_digest = Digest::from_str(digest)?;

        if expected_digest.algorithm() != "sha256" {
            return Err(RegError::validation(format!(
                "Unsupported digest algorithm: {}. Only sha256 is currently supported",
                expected_digest.algorithm()
            )));
        }

        let url = format!("{}/v2/{}/blobs/{}", self.registry_url, repository, digest);

        let response = self
            .get(&url, Some(&pull_scope(repository)), None)
            .await?;
        let response = self.check_response_status(response).await?;

        let blob_bytes = response
            .bytes()
            .await
            .map_err(|e| RegError::network_with_source("Failed to read blob response", e))?;

        let mut hasher = Sha256::new();
        hasher.update(&blob_bytes);
        let computed_hash = format!("{:x}", hasher.finalize());

        if computed_hash != expected_digest.hex() {
            return Err(RegError::validation(format!(
                "Blob digest mismatch: expected {}, computed sha256:{}",
                digest, computed_hash
            )));
        }

        Ok(blob_bytes.to_vec())
    }

    /// Sends a GET, answering a Bearer challenge once if the registry asks.
    ///
    /// The returned response has not been status-checked.
    async fn get(&self, url: &str, scope: Option<&str>, accept: Option<&str>) -> Result<Response> {
        let scope_key = scope.unwrap_or_default().to_string();
        let authorization = self
            .cached_token(&scope_key)
            .map(|token| format!("Bearer {}", token))
            .or_else(|| self.credentials.as_ref().and_then(|c| c.to_header_value()));

        let response = self.send(url, accept, authorization.as_deref()).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        let challenge = response
            .headers()
            .get(WWW_AUTHENTICATE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| AuthChallenge::parse(v).ok())
            .filter(AuthChallenge::is_bearer);

        let Some(challenge) = challenge else {
            return Ok(response);
        };

        let token = self.request_token(&challenge, scope).await?;
        self.tokens
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(scope_key, token.clone());

        self.send(url, accept, Some(&format!("Bearer {}", token)))
            .await
    }

    async fn send(
        &self,
        url: &str,
        accept: Option<&str>,
        authorization: Option<&str>,
    ) -> Result<Response> {
        let mut request = self.http_client.get(url);

        if let Some(accept) = accept {
            request = request.header(ACCEPT, accept);
        }
        if let Some(authorization) = authorization {
            request = request.header(AUTHORIZATION, authorization);
        }

        request
            .send()
            .await
            .map_err(|e| self.translate_reqwest_error(e))
    }

    fn cached_token(&self, scope: &str) -> Option<String> {
        self.tokens
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(scope)
            .cloned()
    }

    /// Exchanges the configured credentials for a token at the challenge realm.
    ///
    /// An identity token is redeemed with an OAuth2 `refresh_token` grant
    /// (`POST realm`); everything else uses the `GET realm` token endpoint,
    /// with Basic auth when a username and password are configured.
    async fn request_token(
        &self,
        challenge: &AuthChallenge,
        scope: Option<&str>,
    ) -> Result<String> {
        let mut params: Vec<(&str, &str)> = Vec::new();
        if let Some(service) = challenge.service.as_deref() {
            params.push(("service", service));
        }
        if let Some(scope) = challenge.scope.as_deref().or(scope) {
            params.push(("scope", scope));
        }

        let request = match &self.credentials {
            Some(Credentials::IdentityToken { token }) => {
                params.push(("grant_type", "refresh_token"));
                params.push(("refresh_token", token.as_str()));
                params.push(("client_id", TOKEN_CLIENT_ID));
                self.http_client.post(&challenge.realm).form(&params)
            }
            Some(Credentials::Basic { username, password }) => self
                .http_client
                .get(&challenge.realm)
                .query(&params)
                .basic_auth(username, Some(password)),
            _ => self.http_client.get(&challenge.realm).query(&params),
        };

        let response = request
            .send()
            .await
            .map_err(|e| self.translate_reqwest_error(e))?;

        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            return Err(RegError::authentication(
                format!("Token request to {} was rejected", challenge.realm),
                Some(response.status().as_u16()),
            ));
        }

        let response = self.check_response_status(response).await?;

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| RegError::validation_with_source("Failed to parse token response", e))?;

        body.into_token().ok_or_else(|| {
            RegError::authentication(
                format!("Token response from {} contained no token", challenge.realm),
                None,
            )
        })
    }

    /// Extracts the next page URL from the Link header.
    ///
    /// `Link: </v2/alpine/tags/list?n=100&last=3.19>; rel="next"`
    fn extract_next_link(headers: &HeaderMap) -> Option<String> {
        let link_header = headers.get(reqwest::header::LINK)?;
        let link_str = link_header.to_str().ok()?;

        for link_part in link_str.split(',') {
            let link_part = link_part.trim();

            if (link_part.contains("rel=\"next\"") || link_part.contains("rel='next'"))
                && let Some(start) = link_part.find('<')
                && let Some(end) = link_part.find('>')
            {
                return Some(link_part[start + 1..end].to_string());
            }
        }

        None
    }

    /// Translates a reqwest error into a RegError.
    fn translate_reqwest_error(&self, error: reqwest::Error) -> RegError {
        if error.is_timeout() {
            RegError::network(format!(
                "Request to {} timed out after {} seconds",
                self.registry_url, self.timeout_seconds
            ))
        } else if error.is_connect() {
            RegError::network_with_source(
                format!("Failed to connect to registry at {}", self.registry_url),
                error,
            )
        } else if error.is_request() {
            RegError::network_with_source(
                format!("Failed to send request to {}", self.registry_url),
                error,
            )
        } else {
            RegError::network_with_source(
                format!("Network error communicating with {}", self.registry_url),
                error,
            )
        }
    }

    /// Checks the HTTP response status and translates errors to RegError.
    async fn check_response_status(&self, response: Response) -> Result<Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let retry_after = parse_retry_after(response.headers());
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("(unable to read response body)"));

        match status {
            StatusCode::UNAUTHORIZED => Err(RegError::authentication(
                format!("Authentication required for {}: {}", url, error_body),
                Some(401),
            )),
            StatusCode::FORBIDDEN => Err(RegError::authentication(
                format!("Access forbidden for {}: {}", url, error_body),
                Some(403),
            )),
            StatusCode::NOT_FOUND => Err(RegError::not_found("endpoint", url.as_str())),
            StatusCode::TOO_MANY_REQUESTS => Err(RegError::rate_limit(
                format!("Rate limit exceeded for {}", url),
                retry_after,
            )),
            s if s.is_server_error() => Err(RegError::server(
                format!("Server error from {}: {}", url, error_body),
                status.as_u16(),
            )),
            _ => Err(RegError::network(format!(
                "HTTP {} from {}: {}",
                status.as_u16(),
                url,
                error_body
            ))),
        }
    }
}

fn pull_scope(repository: &str) -> String {
    format!("repository:{}:pull", repository)
}

/// Reads `Retry-After` as delay-seconds or an HTTP-date.
fn parse_retry_after(headers: &HeaderMap) -> Option<u64> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();

    if let Ok(seconds) = value.parse::<u64>() {
        return Some(seconds);
    }

    let date = chrono::DateTime::parse_from_rfc2822(value).ok()?;
    let delta = date.with_timezone(&chrono::Utc) - chrono::Utc::now();
    u64::try_from(delta.num_seconds()).ok().filter(|s| *s > 0)
}
