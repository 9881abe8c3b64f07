//! Credential lookup for registry authentication.
//!
//! Logins are read from the Docker client configuration
//! (`$DOCKER_CONFIG/config.json` or `~/.docker/config.json`), which is where
//! `docker login` leaves them. The store is read-only.

use crate::auth::Credentials;
use crate::error::{RegError, Result};
use base64::{Engine as _, engine::general_purpose};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;

const DOCKER_HUB_KEY: &str = "index.docker.io";

/// Trait for retrieving registry credentials.
///
/// Allows different credential backends to be used interchangeably.
pub trait CredentialStore {
    /// Retrieve credentials for a registry.
    ///
    /// # Returns
    ///
    /// Returns `Some(Credentials)` if credentials are found, `None` otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if a stored entry cannot be decoded.
    fn get(&self, registry: &str) -> Result<Option<Credentials>>;
}

/// One entry under `auths` in the Docker config file.
#[derive(Debug, Clone, Default, Deserialize)]
struct AuthEntry {
    #[serde(default)]
    auth: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    password: Option<String>,
    #[serde(default, rename = "identitytoken")]
    identity_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DockerConfigFile {
    #[serde(default)]
    auths: HashMap<String, AuthEntry>,
}

/// Credential store backed by the Docker client configuration file.
pub struct DockerConfigStore {
    path: PathBuf,
    auths: HashMap<String, AuthEntry>,
}

impl DockerConfigStore {
    /// Loads the store from an explicit config file path.
    ///
    /// A missing file yields an empty store.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn new(path: PathBuf) -> Result<Self> {
        let auths = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                RegError::config_with_source(
                    "Failed to read Docker config".to_string(),
                    Some(path.display().to_string()),
                    e,
                )
            })?;
            let file: DockerConfigFile = serde_json::from_str(&content).map_err(|e| {
                RegError::config_with_source(
                    "Failed to parse Docker config".to_string(),
                    Some(path.display().to_string()),
                    e,
                )
            })?;
            file.auths
                .into_iter()
                .map(|(key, entry)| (normalize_registry(&key), entry))
                .collect()
        } else {
            HashMap::new()
        };

        Ok(Self { path, auths })
    }

    /// Loads the store from the default location.
    ///
    /// Uses `$DOCKER_CONFIG/config.json` when the variable is set, otherwise
    /// `~/.docker/config.json`.
    pub fn from_default_location() -> Result<Self> {
        Self::new(default_config_path()?)
    }

    /// Path of the file backing this store.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for DockerConfigStore {
    fn get(&self, registry: &str) -> Result<Option<Credentials>> {
        let Some(entry) = self.auths.get(&normalize_registry(registry)) else {
            return Ok(None);
        };

        if let Some(token) = entry.identity_token.as_deref().filter(|t| !t.is_empty()) {
            return Ok(Some(Credentials::identity_token(token)));
        }

        if let (Some(username), Some(password)) = (&entry.username, &entry.password) {
            if !username.is_empty() {
                return Ok(Some(Credentials::basic(username.clone(), password.clone())));
            }
        }

        if let Some(auth) = entry.auth.as_deref().filter(|a| !a.is_empty()) {
            return decode_auth(registry, auth).map(Some);
        }

        Ok(None)
    }
}

fn default_config_path() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os("DOCKER_CONFIG") {
        return Ok(PathBuf::from(dir).join("config.json"));
    }

    let home = dirs::home_dir().ok_or_else(|| {
        RegError::config_with_source(
            "Could not determine home directory",
            None::<String>,
            std::io::Error::new(std::io::ErrorKind::NotFound, "home directory not found"),
        )
    })?;
    Ok(home.join(".docker").join("config.json"))
}

/// Decodes a base64 `user:password` pair.
fn decode_auth(registry: &str, auth: &str) -> Result<Credentials> {
    let bytes = general_purpose::STANDARD.decode(auth.trim()).map_err(|e| {
        RegError::validation_with_source(format!("Invalid auth entry for {}", registry), e)
    })?;
    let decoded = String::from_utf8(bytes).map_err(|e| {
        RegError::validation_with_source(format!("Invalid auth entry for {}", registry), e)
    })?;
    let (username, password) = decoded.split_once(':').ok_or_else(|| {
        RegError::validation(format!(
            "Invalid auth entry for {}: expected username:password",
            registry
        ))
    })?;
    Ok(Credentials::basic(username, password))
}

/// Reduces a registry key to its host, folding Docker Hub aliases together.
///
/// `https://index.docker.io/v1/`, `docker.io` and `registry-1.docker.io`
/// all become `index.docker.io`.
pub(crate) fn normalize_registry(key: &str) -> String {
    let host = key
        .trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://");
    let host = host.split('/').next().unwrap_or(host).to_ascii_lowercase();

    match host.as_str() {
        "docker.io" | "index.docker.io" | "registry-1.docker.io" => DOCKER_HUB_KEY.to_string(),
        _ => host,
    }
}
