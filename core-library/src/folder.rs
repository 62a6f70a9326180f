//! Folder-scoped track scan
//!
//! The media index has no "tracks under this directory" query, so a folder
//! is approximated by a label: the last segment of the folder reference,
//! minus any volume prefix. A track matches when its raw path or its
//! relative path contains the label. The match is a plain case-sensitive
//! substring test and can pick up unrelated folders that share the text.
//! A reference that names no folder (a volume root, or a bare authority)
//! yields an empty label, which matches every music track.
//!
//! ```text
//! content://com.android.externalstorage.documents/tree/primary%3AMusic%2FMyTracks
//!                                                      └──────────┬──────────┘
//!                                      last segment: "primary:Music/MyTracks"
//!                                             label: "Music/MyTracks"
//! ```

use bridge_traits::{IndexQuery, MediaIndex, PathFilter};
use core_runtime::config::IndexSettings;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use url::Url;

use crate::catalog::read_tracks;
use crate::error::{LibraryError, Result};
use crate::index::MediaIndexClient;
use crate::models::FolderScan;
use crate::normalize::MetadataNormalizer;

const VOLUME_SEPARATOR: char = ':';

pub struct FolderScanFilter {
    client: MediaIndexClient,
    normalizer: MetadataNormalizer,
}

impl FolderScanFilter {
    pub fn new(index: Arc<dyn MediaIndex>, settings: &IndexSettings) -> Self {
        Self {
            client: MediaIndexClient::new(index, settings.unknown_sentinel.clone()),
            normalizer: MetadataNormalizer::from_settings(settings),
        }
    }

    /// Scan the tracks that appear to live under `folder_reference`.
    ///
    /// Albums and artists are not recomputed for the subset.
    ///
    /// # Errors
    ///
    /// - `LibraryError::MissingFolderReference` if the reference is absent or
    ///   blank; the index is not queried
    /// - `LibraryError::IndexUnavailable` if the track query fails
    #[instrument(skip_all)]
    pub async fn scan_folder(&self, folder_reference: Option<&str>) -> Result<FolderScan> {
        let reference = folder_reference
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .ok_or(LibraryError::MissingFolderReference)?;

        let label = folder_label(reference);
        debug!(label = %label, "Derived folder label");

        let query = IndexQuery::tracks().with_path_filter(PathFilter::new(label.clone()));
        let tracks = read_tracks(&self.client, &self.normalizer, query).await?;

        info!(label = %label, tracks = tracks.len(), "Folder scan complete");

        Ok(FolderScan {
            tracks,
            folder_label: label,
        })
    }
}

/// Derive the matching label from a folder reference.
///
/// Takes the last non-empty path segment (percent-decoded when the
/// reference is a URL), then drops everything up to and including the
/// first `:`.
///
/// A hierarchical URL with no path segment (`content://authority`) has no
/// last segment and gives `""`, as does a volume root such as `/` or
/// `primary:` after the prefix is dropped. The empty label matches all
/// music tracks.
pub fn folder_label(folder_reference: &str) -> String {
    let segment = last_segment(folder_reference);

    match segment.split_once(VOLUME_SEPARATOR) {
        Some((_volume, rest)) => rest.to_string(),
        None => segment,
    }
}

fn last_segment(folder_reference: &str) -> String {
    // Opaque forms like "primary:Music" parse as URLs but carry no segments
    if let Ok(url) = Url::parse(folder_reference) {
        if !url.cannot_be_a_base() {
            let segment = url
                .path_segments()
                .and_then(|mut segments| segments.rfind(|s| !s.is_empty()));

            return match segment {
                Some(segment) => urlencoding::decode(segment)
                    .map(|decoded| decoded.into_owned())
                    .unwrap_or_else(|_| segment.to_string()),
                None => String::new(),
            };
        }
    }

    folder_reference
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(folder_reference)
        .to_string()
}
