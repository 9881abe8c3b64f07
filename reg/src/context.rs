//! Application context that holds resolved configuration
//!
//! The context is built following the precedence order:
//! 1. Default values
//! 2. Config file values
//! 3. Environment variables (`REG_*`)
//! 4. CLI flags
//!
//! Once built, the context is passed as read-only throughout the application.

use libreg::Credentials;
use libreg::config::{ColorChoice, Config};

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;

/// How much diagnostic output to write to stderr, raised by repeating `-d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum VerbosityLevel {
    /// Results, warnings and errors only
    #[default]
    Normal,
    /// Progress of the command's main steps
    Verbose,
    /// Per-request detail, including non-fatal lookups that failed
    VeryVerbose,
}

impl VerbosityLevel {
    /// Maps the number of `-d` flags to a level.
    pub fn from_count(count: u8) -> Self {
        match count {
            0 => Self::Normal,
            1 => Self::Verbose,
            _ => Self::VeryVerbose,
        }
    }
}

/// Global flags given on the command line; `None`/`false` means "not given".
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub color: Option<ColorChoice>,
    pub insecure: bool,
    pub force_non_ssl: bool,
    pub skip_ping: bool,
    pub timeout: Option<u64>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Application context with resolved configuration and runtime state
#[derive(Debug, Clone)]
pub struct AppContext {
    /// Resolved configuration
    pub config: Config,
    /// Diagnostic output level
    pub verbosity: VerbosityLevel,
    username: Option<String>,
    password: Option<String>,
}

impl AppContext {
    /// Build context with precedence: defaults > config file > env vars > CLI flags
    pub fn build(overrides: CliOverrides, verbosity: VerbosityLevel) -> libreg::Result<Self> {
        let config = Config::load(None)?;
        Ok(Self::from_config(config, overrides, verbosity))
    }

    /// Applies CLI flags on top of an already loaded configuration.
    pub fn from_config(
        mut config: Config,
        overrides: CliOverrides,
        verbosity: VerbosityLevel,
    ) -> Self {
        if let Some(color) = overrides.color {
            config.output.color = color;
        }
        if let Some(timeout) = overrides.timeout {
            config.network.timeout = timeout;
        }
        // Boolean flags can only switch a setting on.
        config.network.insecure |= overrides.insecure;
        config.network.force_non_ssl |= overrides.force_non_ssl;
        config.network.skip_ping |= overrides.skip_ping;

        Self {
            config,
            verbosity,
            username: overrides.username,
            password: overrides.password,
        }
    }

    /// Credentials given with `--username`/`--password`, if any.
    ///
    /// A username without a password authenticates with an empty password.
    pub fn cli_credentials(&self) -> Option<Credentials> {
        let username = self.username.as_deref().filter(|u| !u.is_empty())?;
        Some(Credentials::basic(
            username,
            self.password.clone().unwrap_or_default(),
        ))
    }
}
