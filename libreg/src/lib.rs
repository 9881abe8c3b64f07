//! libreg - Container Registry Inspection Library
//!
//! libreg talks to OCI-compliant container registries and exposes the data a
//! tags listing needs: tag names, single-platform manifests, and image
//! creation times.
//!
//! # Quick Start
//!
//! ```no_run
//! use libreg::{Reference, RegistryBuilder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let reference: Reference = "ghcr.io/owner/app:latest".parse()?;
//!
//!     let registry = RegistryBuilder::new(reference.domain()).build().await?;
//!     for tag in registry.tags(reference.path()).await? {
//!         println!("{}", tag);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Main Types
//!
//! - [`Registry`] / [`RegistryBuilder`] - Connection to one registry host
//! - [`TagSource`] - The read operations the tags command is written against
//! - [`Credentials`] - Authentication credentials
//! - [`Reference`] - Image reference parsing
//! - [`Digest`] - Content digest validation

#![warn(clippy::all)]

/// Returns the libreg crate version.
///
/// # Examples
///
/// ```
/// let version = libreg::version();
/// assert!(!version.is_empty());
/// ```
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// Re-export commonly used types for convenience
pub use auth::{CredentialStore, Credentials, DockerConfigStore};
pub use config::Config;
pub use digest::Digest;
pub use error::{RegError, Result};
pub use oci::ManifestOrIndex;
pub use reference::Reference;
pub use registry::{Registry, RegistryBuilder, TagSource};
pub use tags::TagEntry;

pub mod auth;
pub mod client;
pub mod config;
pub mod digest;
pub mod error;
pub mod format;
pub mod oci;
pub mod reference;
pub mod registry;
pub mod tags;
