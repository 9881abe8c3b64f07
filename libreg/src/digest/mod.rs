//! Content digest validation.
//!
//! Wraps `oci_spec::image::Digest` so digests read from manifests or passed
//! to the client are validated once and reported through [`RegError`].

use crate::error::{Result, RegError};
use oci_spec::image::Digest as OciDigest;
use std::fmt;
use std::str::FromStr;


/// A validated content digest in `algorithm:hex` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest(OciDigest);

impl FromStr for Digest {
    type Err = RegError;

    fn from_str(s: &str) -> Result<Self> {
        let oci_digest = OciDigest::from_str(s).map_err(|e| RegError::Validation {
            message: format!("Invalid digest format: {}", e),
            source: Some(Box::new(e)),
        })?;
        Ok(Digest(oci_digest))
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Digest {
    /// Returns the algorithm name, e.g. `sha256`.
    pub fn algorithm(&self) -> String {
        self.0.algorithm().to_string()
    }

    /// Returns the encoded hash without the algorithm prefix.
    pub fn hex(&self) -> &str {
        self.0.digest()
    }
}
