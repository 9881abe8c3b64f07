//! Authentication handling for OCI registries.
//!
//! Covers the credentials a client presents, parsing of `WWW-Authenticate`
//! challenges for the bearer token flow, and lookup of stored logins.

use crate::error::{Result, RegError};
use serde::Deserialize;

mod store;
pub use store::{CredentialStore, DockerConfigStore};

#[cfg(test)]
mod tests;

/// Credentials for registry authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// No authentication (anonymous access)
    Anonymous,

    /// HTTP Basic authentication with username and password
    Basic {
        /// Username for authentication
        username: String,
        /// Password for authentication
        password: String,
    },

    /// A pre-issued bearer token
    Bearer {
        /// The bearer token
        token: String,
    },

    /// An OAuth2 refresh token (Docker's `identitytoken`).
    ///
    /// Never sent to the registry itself; it is exchanged for an access token
    /// at the realm of a Bearer challenge.
    IdentityToken {
        /// The refresh token
        token: String,
    },
}

impl Credentials {
    /// Creates Basic authentication credentials.
    ///
    /// # Examples
    ///
    /// ```
    /// use libreg::auth::Credentials;
    ///
    /// let creds = Credentials::basic("username", "password");
    /// assert!(creds.to_header_value().unwrap().starts_with("Basic "));
    /// ```
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Creates Bearer token credentials.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer {
            token: token.into(),
        }
    }

    /// Creates refresh-token credentials from a Docker `identitytoken`.
    pub fn identity_token(token: impl Into<String>) -> Self {
        Self::IdentityToken {
            token: token.into(),
        }
    }

    /// Returns the Authorization header value for these credentials.
    ///
    /// `None` for anonymous access and for identity tokens, which only the
    /// token service accepts.
    pub fn to_header_value(&self) -> Option<String> {
        match self {
            Self::Anonymous | Self::IdentityToken { .. } => None,
            Self::Basic { username, password } => {
                use base64::{Engine as _, engine::general_purpose};
                let credentials = format!("{}:{}", username, password);
                let encoded = general_purpose::STANDARD.encode(credentials);
                Some(format!("Basic {}", encoded))
            }
            Self::Bearer { token } => Some(format!("Bearer {}", token)),
        }
    }
}

/// Information parsed from a WWW-Authenticate header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthChallenge {
    /// The authentication scheme (e.g., "Bearer")
    pub scheme: String,

    /// The authentication realm; for Bearer this is the token endpoint
    pub realm: String,

    /// The service identifier
    pub service: Option<String>,

    /// The scope being requested
    pub scope: Option<String>,
}

impl AuthChallenge {
    /// Parses a WWW-Authenticate header value.
    ///
    /// Example header: `Bearer realm="https://auth.example.com/token",service="registry.example.com",scope="repository:alpine:pull"`
    ///
    /// # Examples
    ///
    /// ```
    /// use libreg::auth::AuthChallenge;
    ///
    /// let header = r#"Bearer realm="https://auth.example.com/token",service="registry""#;
    /// let challenge = AuthChallenge::parse(header).unwrap();
    /// assert_eq!(challenge.scheme, "Bearer");
    /// ```
    pub fn parse(header: &str) -> Result<Self> {
        let header = header.trim();

        let (scheme, params) = header
            .split_once(' ')
            .ok_or_else(|| RegError::validation("Invalid WWW-Authenticate header format"))?;

        let mut realm = None;
        let mut service = None;
        let mut scope = None;

        for (key, value) in split_params(params) {
            match key.as_str() {
                "realm" => realm = Some(value),
                "service" => service = Some(value),
                "scope" => scope = Some(value),
                _ => {}
            }
        }

        let realm = realm.ok_or_else(|| {
            RegError::validation("WWW-Authenticate header missing required 'realm' parameter")
        })?;

        Ok(Self {
            scheme: scheme.to_string(),
            realm,
            service,
            scope,
        })
    }

    /// Returns true for the `Bearer` scheme (case-insensitive).
    pub fn is_bearer(&self) -> bool {
        self.scheme.eq_ignore_ascii_case("bearer")
    }
}

/// Splits `key="value",key2=value2` pairs, keeping commas inside quotes.
///
/// Scopes such as `repository:app:pull,push` contain commas, so a plain
/// split on `,` is not enough.
fn split_params(params: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    let mut flush = |current: &mut String| {
        if let Some((key, value)) = current.split_once('=') {
            pairs.push((
                key.trim().to_ascii_lowercase(),
                value.trim().trim_matches('"').to_string(),
            ));
        }
        current.clear();
    };

    for c in params.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            ',' if !in_quotes => flush(&mut current),
            _ => current.push(c),
        }
    }
    flush(&mut current);

    pairs
}

/// Body returned by a token endpoint. Registries use either field name.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    token: Option<String>,
    access_token: Option<String>,
}

impl TokenResponse {
    pub(crate) fn into_token(self) -> Option<String> {
        self.token
            .filter(|t| !t.is_empty())
            .or(self.access_token.filter(|t| !t.is_empty()))
    }
}
