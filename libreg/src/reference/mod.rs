//! Image reference parsing.
//!
//! Wraps `oci_spec::distribution::Reference` so that references given on the
//! command line (`NAME[:TAG|@DIGEST]`) are validated with the distribution
//! grammar and reported through [`RegError`].

use crate::error::{Result, RegError};
use oci_spec::distribution::Reference as OciReference;
use std::fmt;
use std::str::FromStr;

#[cfg(test)]
mod tests;

/// A parsed image reference: domain, repository path and optional tag or digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference(OciReference);

impl FromStr for Reference {
    type Err = RegError;

    fn from_str(s: &str) -> Result<Self> {
        let oci_reference = OciReference::from_str(s).map_err(|e| RegError::Validation {
            message: format!("Invalid image reference '{}': {}", s, e),
            source: Some(Box::new(e)),
        })?;
        if oci_reference.repository().chars().any(|c| c.is_ascii_uppercase()) {
            return Err(RegError::validation(format!(
                "Invalid image reference '{}': repository name must be lowercase",
                s
            )));
        }
        Ok(Reference(oci_reference))
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Reference {
    /// Returns the registry host, e.g. `docker.io` or `localhost:5000`.
    pub fn domain(&self) -> &str {
        self.0.registry()
    }

    /// Returns the repository path within the registry, e.g. `library/alpine`.
    pub fn path(&self) -> &str {
        self.0.repository()
    }

    /// Returns the tag part of the reference, if present.
    pub fn tag(&self) -> Option<&str> {
        self.0.tag()
    }

    /// Returns the digest part of the reference, if present.
    pub fn digest(&self) -> Option<&str> {
        self.0.digest()
    }
}
