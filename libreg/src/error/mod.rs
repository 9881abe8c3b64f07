//! Error types for reg
//!
//! Every fallible operation in `libreg` returns [`RegError`]. Variants follow
//! the failure classes a registry conversation can produce, so callers can
//! decide which ones abort a command and which ones only affect one item.

use thiserror::Error;


type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Error returned by registry, credential and configuration operations
#[derive(Error, Debug)]
pub enum RegError {
    /// Connection refused, DNS failure, timeout or malformed response
    #[error("network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// The registry or its token service rejected the request (401, 403)
    #[error("authentication failed{}: {message}", status_suffix(.status_code))]
    Authentication {
        message: String,
        status_code: Option<u16>,
    },

    /// 404 from the registry
    #[error("{resource_type} not found: {name}")]
    NotFound { resource_type: String, name: String },

    /// 429 from the registry; `retry_after` is in seconds when known
    #[error("rate limited: {message}")]
    RateLimit {
        message: String,
        retry_after: Option<u64>,
    },

    /// 5xx from the registry
    #[error("registry error ({status_code}): {message}")]
    Server { message: String, status_code: u16 },

    /// Input or response that does not have the expected shape
    #[error("validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// Unreadable or malformed configuration or credential store
    #[error("configuration error: {message}{}", path_suffix(.path))]
    Config {
        message: String,
        path: Option<String>,
        #[source]
        source: Option<BoxedSource>,
    },
}

/// Result type alias for registry operations
pub type Result<T> = std::result::Result<T, RegError>;

fn status_suffix(status_code: &Option<u16>) -> String {
    status_code
        .map(|code| format!(" ({})", code))
        .unwrap_or_default()
}

fn path_suffix(path: &Option<String>) -> String {
    path.as_ref()
        .map(|p| format!(" ({})", p))
        .unwrap_or_default()
}

impl RegError {
    /// Creates a network error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libreg::error::RegError;
    ///
    /// let err = RegError::network("connection refused");
    /// assert_eq!(err.to_string(), "network error: connection refused");
    /// ```
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a network error that keeps the underlying cause.
    pub fn network_with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Network {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates an authentication error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libreg::error::RegError;
    ///
    /// let err = RegError::authentication("invalid credentials", Some(401));
    /// assert_eq!(err.to_string(), "authentication failed (401): invalid credentials");
    /// ```
    pub fn authentication(message: impl Into<String>, status_code: Option<u16>) -> Self {
        Self::Authentication {
            message: message.into(),
            status_code,
        }
    }

    /// Creates a not found error for a resource kind and name.
    pub fn not_found(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            name: name.into(),
        }
    }

    /// Creates a rate limit error.
    pub fn rate_limit(message: impl Into<String>, retry_after: Option<u64>) -> Self {
        Self::RateLimit {
            message: message.into(),
            retry_after,
        }
    }

    /// Creates a server error.
    pub fn server(message: impl Into<String>, status_code: u16) -> Self {
        Self::Server {
            message: message.into(),
            status_code,
        }
    }

    /// Creates a validation error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libreg::error::RegError;
    ///
    /// let err = RegError::validation("manifest has no config");
    /// assert!(matches!(err, RegError::Validation { .. }));
    /// ```
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a validation error that keeps the underlying cause.
    pub fn validation_with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Validation {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a configuration error, optionally naming the offending file.
    ///
    /// # Examples
    ///
    /// ```
    /// use libreg::error::RegError;
    /// use std::io;
    ///
    /// let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
    /// let err = RegError::config_with_source("unreadable", Some("/etc/reg.toml"), io_err);
    /// assert_eq!(err.to_string(), "configuration error: unreadable (/etc/reg.toml)");
    /// ```
    pub fn config_with_source<E>(
        message: impl Into<String>,
        path: Option<impl Into<String>>,
        source: E,
    ) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Config {
            message: message.into(),
            path: path.map(Into::into),
            source: Some(Box::new(source)),
        }
    }
}
