//! In-memory media index
//!
//! Holds rows in plain vectors and serves them through the same cursor
//! contract as the SQLite index. Used for tests, demos and hosts that want
//! to feed a fixed catalog into the scanner.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    media_index::{
        IndexCursor, IndexQuery, MediaIndex, RawAlbum, RawArtist, RawRecord, RawTrack,
        RecordKind,
    },
};
use serde::Deserialize;
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Small bundled library used when no device index is available
const DEMO_LIBRARY: &str = include_str!("../fixtures/demo_library.json");

/// JSON layout accepted by [`InMemoryMediaIndex::from_json`]
#[derive(Debug, Default, Deserialize)]
struct Fixture {
    #[serde(default)]
    tracks: Vec<RawTrack>,
    #[serde(default)]
    albums: Vec<RawAlbum>,
    #[serde(default)]
    artists: Vec<RawArtist>,
}

/// Media index backed by in-memory rows.
///
/// Tracks how many cursors are currently open so callers can assert that
/// every cursor was released, including on error paths.
#[derive(Debug, Default)]
pub struct InMemoryMediaIndex {
    tracks: Vec<RawTrack>,
    albums: Vec<RawAlbum>,
    artists: Vec<RawArtist>,
    failing: HashSet<RecordKind>,
    open_cursors: Arc<AtomicUsize>,
    queries: AtomicUsize,
}

impl InMemoryMediaIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load rows from a `{"tracks": [...], "albums": [...], "artists": [...]}`
    /// document. Missing sections are treated as empty.
    pub fn from_json(json: &str) -> Result<Self> {
        let fixture: Fixture = serde_json::from_str(json)
            .map_err(|e| BridgeError::OperationFailed(format!("Invalid index fixture: {}", e)))?;

        debug!(
            tracks = fixture.tracks.len(),
            albums = fixture.albums.len(),
            artists = fixture.artists.len(),
            "Loaded in-memory index fixture"
        );

        Ok(Self::new()
            .with_tracks(fixture.tracks)
            .with_albums(fixture.albums)
            .with_artists(fixture.artists))
    }

    /// Index over the bundled demo library
    pub fn demo() -> Result<Self> {
        Self::from_json(DEMO_LIBRARY)
    }

    pub fn with_tracks(mut self, tracks: Vec<RawTrack>) -> Self {
        self.tracks = tracks;
        self
    }

    pub fn with_albums(mut self, albums: Vec<RawAlbum>) -> Self {
        self.albums = albums;
        self
    }

    pub fn with_artists(mut self, artists: Vec<RawArtist>) -> Self {
        self.artists = artists;
        self
    }

    /// Make every query of `kind` fail as if the index were unreachable
    pub fn fail_on(mut self, kind: RecordKind) -> Self {
        self.failing.insert(kind);
        self
    }

    /// Cursors handed out and not yet dropped
    pub fn open_cursor_count(&self) -> usize {
        self.open_cursors.load(Ordering::SeqCst)
    }

    /// Cursors handed out since creation
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn select(&self, query: &IndexQuery) -> VecDeque<RawRecord> {
        match query.kind {
            RecordKind::Track => {
                let mut rows: Vec<&RawTrack> = self
                    .tracks
                    .iter()
                    .filter(|t| t.is_music)
                    .filter(|t| {
                        query.path_filter.as_ref().map_or(true, |filter| {
                            filter.matches(t.source_path.as_deref(), t.relative_path.as_deref())
                        })
                    })
                    .collect();
                rows.sort_by(|a, b| (&a.title, a.id).cmp(&(&b.title, b.id)));
                rows.into_iter().cloned().map(RawRecord::Track).collect()
            }
            RecordKind::Album => {
                let mut rows: Vec<&RawAlbum> = self.albums.iter().collect();
                rows.sort_by(|a, b| (&a.title, a.id).cmp(&(&b.title, b.id)));
                rows.into_iter().cloned().map(RawRecord::Album).collect()
            }
            RecordKind::Artist => {
                let mut rows: Vec<&RawArtist> = self.artists.iter().collect();
                rows.sort_by(|a, b| (&a.name, a.id).cmp(&(&b.name, b.id)));
                rows.into_iter().cloned().map(RawRecord::Artist).collect()
            }
        }
    }
}

#[async_trait]
impl MediaIndex for InMemoryMediaIndex {
    async fn open_cursor(&self, query: IndexQuery) -> Result<Box<dyn IndexCursor>> {
        if self.failing.contains(&query.kind) {
            return Err(BridgeError::NotAvailable(format!(
                "media index rejected {} query",
                query.kind
            )));
        }

        let rows = self.select(&query);
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.open_cursors.fetch_add(1, Ordering::SeqCst);

        debug!(kind = %query.kind, rows = rows.len(), "Opened in-memory cursor");

        Ok(Box::new(MemoryCursor {
            rows,
            open_cursors: Arc::clone(&self.open_cursors),
        }))
    }
}

struct MemoryCursor {
    rows: VecDeque<RawRecord>,
    open_cursors: Arc<AtomicUsize>,
}

#[async_trait]
impl IndexCursor for MemoryCursor {
    async fn next_row(&mut self) -> Result<Option<RawRecord>> {
        Ok(self.rows.pop_front())
    }
}

impl Drop for MemoryCursor {
    fn drop(&mut self) {
        self.open_cursors.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::media_index::PathFilter;

    fn track(id: i64, title: Option<&str>, path: &str) -> RawTrack {
        RawTrack {
            id,
            title: title.map(str::to_string),
            artist: None,
            album: None,
            album_id: 0,
            artist_id: 0,
            duration_ms: None,
            source_path: Some(path.to_string()),
            relative_path: None,
            is_music: true,
        }
    }

    async fn ids(index: &InMemoryMediaIndex, query: IndexQuery) -> Vec<i64> {
        let mut cursor = index.open_cursor(query).await.unwrap();
        let mut ids = Vec::new();
        while let Some(row) = cursor.next_row().await.unwrap() {
            ids.push(match row {
                RawRecord::Track(t) => t.id,
                RawRecord::Album(a) => a.id,
                RawRecord::Artist(a) => a.id,
            });
        }
        ids
    }

    #[tokio::test]
    async fn test_tracks_sorted_and_filtered() {
        let mut voice_memo = track(9, Some("Memo"), "/Recordings/memo.m4a");
        voice_memo.is_music = false;

        let index = InMemoryMediaIndex::new().with_tracks(vec![
            track(3, Some("B"), "/Music/Pop/b.mp3"),
            track(1, Some("A"), "/Music/Rock/a.mp3"),
            track(2, None, "/Music/Pop/n.mp3"),
            track(4, Some("A"), "/Music/Pop/a.mp3"),
            voice_memo,
        ]);

        assert_eq!(ids(&index, IndexQuery::tracks()).await, vec![2, 1, 4, 3]);

        let pop = IndexQuery::tracks().with_path_filter(PathFilter::new("Pop"));
        assert_eq!(ids(&index, pop).await, vec![2, 4, 3]);
    }

    #[tokio::test]
    async fn test_cursor_count_follows_drop() {
        let index = InMemoryMediaIndex::new().with_tracks(vec![track(1, Some("A"), "/a")]);

        let cursor = index.open_cursor(IndexQuery::tracks()).await.unwrap();
        assert_eq!(index.open_cursor_count(), 1);
        drop(cursor);

        assert_eq!(index.open_cursor_count(), 0);
        assert_eq!(index.query_count(), 1);
    }

    #[tokio::test]
    async fn test_fail_on_kind() {
        let index = InMemoryMediaIndex::new().fail_on(RecordKind::Album);

        assert!(matches!(
            index.open_cursor(IndexQuery::albums()).await,
            Err(BridgeError::NotAvailable(_))
        ));
        assert!(index.open_cursor(IndexQuery::artists()).await.is_ok());
        assert_eq!(index.open_cursor_count(), 0);
    }

    #[tokio::test]
    async fn test_from_json_fixture() {
        let index = InMemoryMediaIndex::from_json(
            r#"{
                "tracks": [{"id": 5, "title": "Song", "album_id": 1, "artist_id": 2}],
                "artists": [{"id": 2, "name": "Band"}]
            }"#,
        )
        .unwrap();

        assert_eq!(ids(&index, IndexQuery::tracks()).await, vec![5]);
        assert!(ids(&index, IndexQuery::albums()).await.is_empty());
        assert_eq!(ids(&index, IndexQuery::artists()).await, vec![2]);
    }

    #[tokio::test]
    async fn test_demo_library_hides_non_music() {
        let index = InMemoryMediaIndex::demo().unwrap();

        assert_eq!(ids(&index, IndexQuery::tracks()).await, vec![102, 101, 103]);
        assert_eq!(ids(&index, IndexQuery::albums()).await, vec![12, 11]);
        assert_eq!(ids(&index, IndexQuery::artists()).await, vec![22, 21]);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            InMemoryMediaIndex::from_json("not json"),
            Err(BridgeError::OperationFailed(_))
        ));
    }
}
