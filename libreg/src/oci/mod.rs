//! OCI data structures and derived manifest values.
//!
//! Re-exports the `oci-spec` types used by `libreg` and adds the small
//! calculations the tags listing needs on top of a manifest.

pub use oci_spec::image::{ImageConfiguration, ImageIndex, ImageManifest};

use crate::error::{Result, RegError};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Either a single-platform image manifest or a multi-platform image index.
///
/// A tag may point at either one; registries answer with whichever the tag
/// references among the media types the client accepts.
#[derive(Debug, Clone)]
#[allow(clippy::large_enum_variant)]
pub enum ManifestOrIndex {
    /// A single-platform image manifest
    Manifest(ImageManifest),
    /// A multi-platform image index (or Docker manifest list)
    Index(ImageIndex),
}

impl ManifestOrIndex {
    /// Parse manifest bytes, detecting whether they hold a manifest or an index.
    ///
    /// The `mediaType` field decides when present; otherwise the presence of
    /// `manifests` (index) or `layers`/`config` (manifest) does.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_slice(bytes)
            .map_err(|e| RegError::validation_with_source("Failed to parse manifest JSON", e))?;

        let media_type = value
            .get("mediaType")
            .and_then(|v| v.as_str())
            .unwrap_or("");

        let is_index = if media_type.contains("index") || media_type.contains("list") {
            true
        } else if media_type.contains("manifest") {
            false
        } else if value.get("manifests").is_some() {
            true
        } else if value.get("layers").is_some() || value.get("config").is_some() {
            false
        } else {
            return Err(RegError::validation(
                "Unable to determine if content is a manifest or index",
            ));
        };

        if is_index {
            let index: ImageIndex = serde_json::from_value(value)
                .map_err(|e| RegError::validation_with_source("Failed to parse image index", e))?;
            Ok(ManifestOrIndex::Index(index))
        } else {
            let manifest: ImageManifest = serde_json::from_value(value).map_err(|e| {
                RegError::validation_with_source("Failed to parse image manifest", e)
            })?;
            Ok(ManifestOrIndex::Manifest(manifest))
        }
    }
}

/// Total compressed size of an image: every layer plus the config blob.
///
/// # Examples
///
/// ```
/// use libreg::oci::{ImageManifest, total_size};
///
/// let manifest: ImageManifest = serde_json::from_str(r#"{
///     "schemaVersion": 2,
///     "config": {
///         "mediaType": "application/vnd.oci.image.config.v1+json",
///         "size": 5,
///         "digest": "sha256:b5b2b2c507a0944348e0303114d8d93aaaa081732b86451d9bce1f432a537bc7"
///     },
///     "layers": []
/// }"#).unwrap();
/// assert_eq!(total_size(&manifest), 5);
/// ```
pub fn total_size(manifest: &ImageManifest) -> u64 {
    let layers: u64 = manifest.layers().iter().map(|layer| layer.size()).sum();
    layers + manifest.config().size()
}

/// Digest of the topmost layer, or `None` for a manifest without layers.
pub fn last_layer_digest(manifest: &ImageManifest) -> Option<String> {
    manifest
        .layers()
        .last()
        .map(|layer| layer.digest().to_string())
}

/// The only part of an image config blob the tags listing reads.
///
/// Deserializing into the full `ImageConfiguration` would reject configs
/// that omit fields it requires, and older images often do.
#[derive(Debug, Deserialize)]
struct ConfigCreated {
    #[serde(default)]
    created: Option<String>,
}

/// Creation time recorded in an image config blob.
///
/// Returns `Ok(None)` when the blob has no `created` field.
///
/// # Errors
///
/// Returns a validation error if the blob is not JSON or the timestamp is
/// not RFC 3339.
pub fn created_date(config_blob: &[u8]) -> Result<Option<DateTime<Utc>>> {
    let config: ConfigCreated = serde_json::from_slice(config_blob)
        .map_err(|e| RegError::validation_with_source("Failed to parse image config", e))?;

    let Some(created) = config.created.filter(|c| !c.is_empty()) else {
        return Ok(None);
    };

    let timestamp = DateTime::parse_from_rfc3339(&created).map_err(|e| {
        RegError::validation_with_source(format!("Invalid created timestamp '{}'", created), e)
    })?;
    Ok(Some(timestamp.with_timezone(&Utc)))
}
