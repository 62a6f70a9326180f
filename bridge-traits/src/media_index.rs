//! Media Index Abstraction
//!
//! Provides the platform-agnostic contract for reading the host's media index:
//! - Android: `MediaStore` audio, album and artist tables
//! - Desktop: a SQLite database with the same shape (see `bridge-desktop`)
//! - Tests: a deterministic in-memory fixture
//!
//! ## Cursors
//!
//! Every query hands back an [`IndexCursor`]. A cursor owns whatever the
//! platform needs to stream rows (a database connection, a native cursor
//! handle) and gives it back when dropped. Callers must never hold on to a
//! cursor longer than a single query; the pool of such handles is bounded.
//!
//! ## Raw rows
//!
//! Rows are returned exactly as the index stores them. Text columns are
//! nullable and may contain the index's "unknown" sentinel; the core is
//! responsible for scrubbing and defaulting them.
//!
//! ```ignore
//! use bridge_traits::media_index::{IndexQuery, MediaIndex};
//!
//! async fn count_tracks(index: &dyn MediaIndex) -> Result<usize> {
//!     let mut cursor = index.open_cursor(IndexQuery::tracks()).await?;
//!     let mut count = 0;
//!     while cursor.next_row().await?.is_some() {
//!         count += 1;
//!     }
//!     Ok(count)
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

// =============================================================================
// Record kinds and queries
// =============================================================================

/// The three record kinds exposed by the media index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Track,
    Album,
    Artist,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Track => "track",
            RecordKind::Album => "album",
            RecordKind::Artist => "artist",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Substring predicate over a track's location fields.
///
/// Matches when either the raw source path or the structured relative path
/// contains `needle`. Matching is case-sensitive and unanchored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathFilter {
    pub needle: String,
}

impl PathFilter {
    pub fn new(needle: impl Into<String>) -> Self {
        Self {
            needle: needle.into(),
        }
    }

    pub fn matches(&self, source_path: Option<&str>, relative_path: Option<&str>) -> bool {
        let hit = |field: Option<&str>| field.is_some_and(|v| v.contains(self.needle.as_str()));
        hit(source_path) || hit(relative_path)
    }
}

/// A single query against the media index.
///
/// Track queries always select music-classified entries only; `path_filter`
/// narrows them further and is ignored for albums and artists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexQuery {
    pub kind: RecordKind,
    pub path_filter: Option<PathFilter>,
}

impl IndexQuery {
    pub fn tracks() -> Self {
        Self {
            kind: RecordKind::Track,
            path_filter: None,
        }
    }

    pub fn albums() -> Self {
        Self {
            kind: RecordKind::Album,
            path_filter: None,
        }
    }

    pub fn artists() -> Self {
        Self {
            kind: RecordKind::Artist,
            path_filter: None,
        }
    }

    pub fn with_path_filter(mut self, filter: PathFilter) -> Self {
        self.path_filter = Some(filter);
        self
    }
}

// =============================================================================
// Raw rows
// =============================================================================

fn default_true() -> bool {
    true
}

/// Track row as stored in the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTrack {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub album: Option<String>,
    pub album_id: i64,
    pub artist_id: i64,
    /// Duration in milliseconds
    #[serde(default)]
    pub duration_ms: Option<i64>,
    /// Absolute file path (`_data` column)
    #[serde(default)]
    pub source_path: Option<String>,
    /// Volume-relative directory (`relative_path` column)
    #[serde(default)]
    pub relative_path: Option<String>,
    #[serde(default = "default_true")]
    pub is_music: bool,
}

/// Album row as stored in the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAlbum {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub num_songs: Option<i64>,
    /// First release year, as text; may be absent or garbage
    #[serde(default)]
    pub first_year: Option<String>,
}

/// Artist row as stored in the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawArtist {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub num_tracks: Option<i64>,
    #[serde(default)]
    pub num_albums: Option<i64>,
}

/// One row of any kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawRecord {
    Track(RawTrack),
    Album(RawAlbum),
    Artist(RawArtist),
}

impl RawRecord {
    pub fn kind(&self) -> RecordKind {
        match self {
            RawRecord::Track(_) => RecordKind::Track,
            RawRecord::Album(_) => RecordKind::Album,
            RawRecord::Artist(_) => RecordKind::Artist,
        }
    }
}

// =============================================================================
// Capability traits
// =============================================================================

/// Forward-only read handle over the rows of one query.
///
/// Dropping the cursor releases the underlying resource. Implementations
/// must release in `Drop` so that early termination (an error raised while
/// the caller is still consuming rows) never leaks a handle.
#[async_trait]
pub trait IndexCursor: Send {
    /// Fetch the next row, or `None` once the result set is exhausted
    async fn next_row(&mut self) -> Result<Option<RawRecord>>;
}

/// Queryable media index maintained by the host platform.
///
/// Rows are ordered ascending by title (tracks, albums) or name (artists),
/// with ties broken by numeric id. An empty result set is not an error.
///
/// # Errors
///
/// Implementations return a `BridgeError` when the index cannot be reached
/// or the query cannot be executed.
#[async_trait]
pub trait MediaIndex: Send + Sync {
    /// Run `query` and return a cursor positioned before the first row
    async fn open_cursor(&self, query: IndexQuery) -> Result<Box<dyn IndexCursor>>;
}
