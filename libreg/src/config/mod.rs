//! Application configuration.
//!
//! Defaults are merged with an optional TOML file and then with `REG_*`
//! environment variables (`REG_NETWORK__TIMEOUT=60` sets `network.timeout`).
//! Command-line flags are applied on top by the binary.

use crate::error::{RegError, Result};
use config::{Config as ConfigRs, Environment, File, FileFormat, Map};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;


/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "REG_CONFIG";

/// Root configuration structure.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub network: Network,
}

type Builder = config::ConfigBuilder<config::builder::DefaultState>;

impl Config {
    /// Parses a `Config` from a TOML string, on top of the defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let builder = Self::defaults()?.add_source(File::from_str(s, FileFormat::Toml));
        Self::from_builder(builder, None)
    }

    /// Loads a `Config` from an optional file path plus the process environment.
    ///
    /// With `None`, the default location from [`config_path`] is read if it
    /// exists. A path given explicitly or through `$REG_CONFIG` must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Like [`Config::load`], but reads `REG_*` overrides from `env` instead of
    /// the process environment when given.
    pub fn load_with_env(path: Option<&Path>, env: Option<Map<String, String>>) -> Result<Self> {
        let mut builder = Self::defaults()?;

        let file = match path {
            Some(p) => Some((p.to_path_buf(), true)),
            None => match std::env::var_os(CONFIG_ENV) {
                Some(p) => Some((PathBuf::from(p), true)),
                None => config_path().filter(|p| p.exists()).map(|p| (p, false)),
            },
        };

        if let Some((p, required)) = &file {
            builder = builder.add_source(
                File::from(p.as_path())
                    .format(FileFormat::Toml)
                    .required(*required),
            );
        }

        builder = builder.add_source(
            Environment::with_prefix("REG")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        Self::from_builder(builder, file.map(|(p, _)| p))
    }

    fn defaults() -> Result<Builder> {
        let defaults = ConfigRs::try_from(&Config::default()).map_err(|e| {
            RegError::config_with_source(
                "Failed to build default configuration",
                None::<String>,
                e,
            )
        })?;
        Ok(ConfigRs::builder().add_source(defaults))
    }

    /// Creates a `Config` from a `config::ConfigBuilder`.
    fn from_builder(builder: Builder, path: Option<PathBuf>) -> Result<Self> {
        builder
            .build()
            .and_then(|cfg| cfg.try_deserialize())
            .map_err(|e| {
                RegError::config_with_source(
                    "Failed to deserialize configuration".to_string(),
                    path.map(|p| p.display().to_string()),
                    e,
                )
            })
    }
}

/// Default config file location: `$REG_CONFIG`, else `<config_dir>/reg/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("reg").join("config.toml"))
}

/// Output settings.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Default, Clone)]
pub struct Output {
    #[serde(default)]
    pub color: ColorChoice,
}

/// Enum for color output choices.
#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    #[default]
    Auto,

    Always,

    Never,
}

impl FromStr for ColorChoice {
    type Err = RegError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "always" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            other => Err(RegError::validation(format!(
                "Invalid color choice '{}': expected auto, always or never",
                other
            ))),
        }
    }
}

/// Network settings.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Network {
    /// Per-request timeout in seconds
    #[serde(default = "default_network_timeout")]
    pub timeout: u64,

    /// Accept invalid TLS certificates
    #[serde(default)]
    pub insecure: bool,

    /// Use plain HTTP
    #[serde(default)]
    pub force_non_ssl: bool,

    /// Do not check `/v2/` before the first request
    #[serde(default)]
    pub skip_ping: bool,
}

impl Default for Network {
    fn default() -> Self {
        Self {
            timeout: default_network_timeout(),
            insecure: false,
            force_non_ssl: false,
            skip_ping: false,
        }
    }
}

fn default_network_timeout() -> u64 {
    30
}
