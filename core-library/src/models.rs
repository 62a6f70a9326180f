//! Domain models for the scanned catalog
//!
//! Every entity is built fresh per scan and serializes to the camelCase
//! payload the host bridge hands to the calling application.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// Domain Models
// =============================================================================

/// Music track as it appears in a catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Catalog identifier (`t_<n>`)
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    /// References [`Album::id`]; never checked against the albums collection
    pub album_id: String,
    /// References [`Artist::id`]; never checked against the artists collection
    pub artist_id: String,
    /// Whole seconds, truncated
    #[serde(rename = "duration")]
    pub duration_seconds: u64,
    /// Raw file path as reported by the index, empty when unknown
    #[serde(rename = "src")]
    pub source_path: String,
    /// Opaque playable locator
    #[serde(rename = "contentUri")]
    pub content_reference: String,
    /// Opaque artwork locator; the artwork may not exist
    #[serde(rename = "cover")]
    pub cover_reference: String,
}

/// Album as it appears in a catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    /// Catalog identifier (`a_<n>`)
    pub id: String,
    pub title: String,
    pub artist: String,
    #[serde(rename = "cover")]
    pub cover_reference: String,
    /// First release year, 0 when unknown
    pub year: i32,
    pub num_songs: u32,
}

/// Artist as it appears in a catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    /// Catalog identifier (`ar_<n>`)
    pub id: String,
    pub name: String,
    pub num_tracks: u32,
    pub num_albums: u32,
    /// Always empty: the index carries no artist imagery
    pub image: String,
}

/// Result of a full scan.
///
/// The three collections are filled by independent queries and are not
/// joined; a track may reference an album or artist id that has no entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub tracks: Vec<Track>,
    pub albums: Vec<Album>,
    pub artists: Vec<Artist>,
}

impl Catalog {
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty() && self.albums.is_empty() && self.artists.is_empty()
    }

    /// Track ids grouped by the album id they reference, in track order
    pub fn track_ids_by_album(&self) -> HashMap<String, Vec<String>> {
        let mut map: HashMap<String, Vec<String>> = HashMap::new();
        for track in &self.tracks {
            map.entry(track.album_id.clone())
                .or_default()
                .push(track.id.clone());
        }
        map
    }

    /// Artist id of the first track seen for each album id
    pub fn album_artist_ids(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        for track in &self.tracks {
            map.entry(track.album_id.clone())
                .or_insert_with(|| track.artist_id.clone());
        }
        map
    }
}

/// Result of a folder-scoped scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderScan {
    pub tracks: Vec<Track>,
    /// Label the tracks were matched against
    #[serde(rename = "folder")]
    pub folder_label: String,
}
