//! Tag listing: plain sorted names, or per-tag entries with manifest data.

use crate::error::RegError;
use crate::format::{format_rfc3339, format_size};
use crate::oci::{self, ImageManifest};
use crate::registry::TagSource;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;


/// One row of the verbose tags listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEntry {
    /// Tag name
    pub tag: String,
    /// Human-readable total compressed size
    pub compressed: String,
    /// Digest of the topmost layer, empty when the image has none
    pub last_layer: String,
    /// RFC 3339 creation time, empty when unknown
    pub created: String,
}

impl TagEntry {
    /// Builds an entry from a tag's manifest and optional creation time.
    pub fn new(tag: &str, manifest: &ImageManifest, created: Option<DateTime<Utc>>) -> Self {
        Self {
            tag: tag.to_string(),
            compressed: format_size(oci::total_size(manifest)),
            last_layer: oci::last_layer_digest(manifest).unwrap_or_default(),
            created: created.map(|c| format_rfc3339(&c)).unwrap_or_default(),
        }
    }
}

/// Orders entries newest first; entries without a creation time go last,
/// and equal times fall back to the tag name.
///
/// RFC 3339 strings in UTC with a fixed precision sort the same way as the
/// instants they name, so the strings are compared directly.
pub fn compare_entries(a: &TagEntry, b: &TagEntry) -> Ordering {
    let by_created = match (a.created.is_empty(), b.created.is_empty()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.created.cmp(&a.created),
    };
    by_created.then_with(|| a.tag.cmp(&b.tag))
}

/// Sorts entries with [`compare_entries`].
pub fn sort_entries(entries: &mut [TagEntry]) {
    entries.sort_by(compare_entries);
}

/// Sorts tag names ascending (byte-wise) and joins them with newlines.
///
/// # Examples
///
/// ```
/// use libreg::tags::plain_listing;
///
/// let tags = vec!["b".to_string(), "a".to_string(), "c".to_string()];
/// assert_eq!(plain_listing(tags), "a\nb\nc");
/// ```
pub fn plain_listing(mut tags: Vec<String>) -> String {
    tags.sort();
    tags.join("\n")
}

/// What happened to a single tag while collecting entries.
#[derive(Debug)]
pub enum TagEvent<'a> {
    /// The manifest could not be fetched; the tag is left out.
    Skipped { tag: &'a str, error: &'a RegError },
    /// The creation date lookup failed; the entry has no timestamp.
    CreatedUnavailable { tag: &'a str, error: &'a RegError },
    /// The tag was processed, successfully or not.
    Done,
}

/// Builds entries for `tags` in order, one request at a time.
///
/// A manifest failure drops the tag; a creation date failure only blanks the
/// timestamp. `on_event` is told about both and about every finished tag,
/// which is how callers drive progress output.
///
/// The returned entries are not sorted.
pub async fn collect_entries<S, F>(
    source: &S,
    repository: &str,
    tags: &[String],
    mut on_event: F,
) -> Vec<TagEntry>
where
    S: TagSource,
    F: FnMut(TagEvent<'_>),
{
    let mut entries = Vec::with_capacity(tags.len());

    for tag in tags {
        let manifest = match source.manifest_v2(repository, tag).await {
            Ok(manifest) => manifest,
            Err(error) => {
                on_event(TagEvent::Skipped { tag, error: &error });
                on_event(TagEvent::Done);
                continue;
            }
        };

        let created = match source.tag_created_date(repository, tag).await {
            Ok(created) => created,
            Err(error) => {
                on_event(TagEvent::CreatedUnavailable { tag, error: &error });
                None
            }
        };

        entries.push(TagEntry::new(tag, &manifest, created));
        on_event(TagEvent::Done);
    }

    entries
}
