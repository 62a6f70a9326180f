//! Metadata normalization
//!
//! Turns scrubbed index rows into clean rows: fallback text for missing
//! values, whole-second durations, and locators derived from numeric ids.
//! Catalog identifiers are not assigned here.

use bridge_traits::{RawAlbum, RawArtist, RawRecord, RawTrack};
use core_runtime::config::IndexSettings;

pub const UNKNOWN_TITLE: &str = "Unknown";
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanTrack {
    pub numeric_id: i64,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub album_numeric_id: i64,
    pub artist_numeric_id: i64,
    pub duration_seconds: u64,
    pub source_path: String,
    pub content_reference: String,
    pub cover_reference: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanAlbum {
    pub numeric_id: i64,
    pub title: String,
    pub artist: String,
    pub cover_reference: String,
    pub year: i32,
    pub num_songs: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanArtist {
    pub numeric_id: i64,
    pub name: String,
    pub num_tracks: u32,
    pub num_albums: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanRecord {
    Track(CleanTrack),
    Album(CleanAlbum),
    Artist(CleanArtist),
}

/// Normalizes rows of every kind.
///
/// Expects rows that already went through [`MediaIndexClient`](crate::MediaIndexClient):
/// sentinel text must already be `None`.
#[derive(Debug, Clone)]
pub struct MetadataNormalizer {
    content_base_uri: String,
    artwork_base_uri: String,
}

impl MetadataNormalizer {
    pub fn new(content_base_uri: impl Into<String>, artwork_base_uri: impl Into<String>) -> Self {
        Self {
            content_base_uri: content_base_uri.into(),
            artwork_base_uri: artwork_base_uri.into(),
        }
    }

    pub fn from_settings(settings: &IndexSettings) -> Self {
        Self::new(
            settings.content_base_uri.clone(),
            settings.artwork_base_uri.clone(),
        )
    }

    pub fn normalize(&self, raw: RawRecord) -> CleanRecord {
        match raw {
            RawRecord::Track(track) => CleanRecord::Track(self.normalize_track(track)),
            RawRecord::Album(album) => CleanRecord::Album(self.normalize_album(album)),
            RawRecord::Artist(artist) => CleanRecord::Artist(self.normalize_artist(artist)),
        }
    }

    pub fn normalize_track(&self, raw: RawTrack) -> CleanTrack {
        CleanTrack {
            numeric_id: raw.id,
            title: text_or(raw.title, UNKNOWN_TITLE),
            artist: text_or(raw.artist, UNKNOWN_ARTIST),
            album: text_or(raw.album, UNKNOWN_ALBUM),
            album_numeric_id: raw.album_id,
            artist_numeric_id: raw.artist_id,
            duration_seconds: whole_seconds(raw.duration_ms),
            source_path: raw.source_path.unwrap_or_default(),
            content_reference: join_reference(&self.content_base_uri, raw.id),
            cover_reference: join_reference(&self.artwork_base_uri, raw.album_id),
        }
    }

    pub fn normalize_album(&self, raw: RawAlbum) -> CleanAlbum {
        CleanAlbum {
            numeric_id: raw.id,
            title: text_or(raw.title, UNKNOWN_ALBUM),
            artist: text_or(raw.artist, UNKNOWN_ARTIST),
            cover_reference: join_reference(&self.artwork_base_uri, raw.id),
            year: parse_year(raw.first_year.as_deref()),
            num_songs: count(raw.num_songs),
        }
    }

    pub fn normalize_artist(&self, raw: RawArtist) -> CleanArtist {
        CleanArtist {
            numeric_id: raw.id,
            name: text_or(raw.name, UNKNOWN_ARTIST),
            num_tracks: count(raw.num_tracks),
            num_albums: count(raw.num_albums),
        }
    }
}

fn text_or(value: Option<String>, fallback: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

// Truncating division; a negative duration counts as zero
fn whole_seconds(duration_ms: Option<i64>) -> u64 {
    duration_ms.map_or(0, |ms| ms.max(0) as u64 / 1000)
}

fn count(value: Option<i64>) -> u32 {
    value.map_or(0, |n| u32::try_from(n.max(0)).unwrap_or(u32::MAX))
}

fn parse_year(value: Option<&str>) -> i32 {
    value.and_then(|y| y.trim().parse().ok()).unwrap_or(0)
}

fn join_reference(base: &str, id: i64) -> String {
    format!("{}/{}", base.trim_end_matches('/'), id)
}
