//! Media index client
//!
//! Thin reader over the host's [`MediaIndex`]. It owns the cursor for the
//! whole of one query and converts the index's "unknown" sentinel into a
//! plain `None`, so nothing past this point ever sees the magic string.

use bridge_traits::{IndexQuery, MediaIndex, RawAlbum, RawArtist, RawRecord, RawTrack};
use std::sync::Arc;
use tracing::debug;

use crate::error::{LibraryError, Result};

pub struct MediaIndexClient {
    index: Arc<dyn MediaIndex>,
    unknown_sentinel: String,
}

impl MediaIndexClient {
    pub fn new(index: Arc<dyn MediaIndex>, unknown_sentinel: impl Into<String>) -> Self {
        Self {
            index,
            unknown_sentinel: unknown_sentinel.into(),
        }
    }

    /// Run `query` and collect every row, scrubbed of sentinel values.
    pub async fn query(&self, query: IndexQuery) -> Result<Vec<RawRecord>> {
        self.query_map(query, Ok).await
    }

    /// Run `query` and pass each scrubbed row through `map` as it is read.
    ///
    /// The cursor is dropped, and its resource released, on every return
    /// path: exhaustion, a cursor error, or an error returned by `map`.
    ///
    /// # Errors
    ///
    /// - `LibraryError::IndexUnavailable` if the cursor cannot be opened or read
    /// - `LibraryError::UnexpectedRecord` if the index returns a row of another kind
    /// - whatever `map` returns
    pub async fn query_map<T, F>(&self, query: IndexQuery, mut map: F) -> Result<Vec<T>>
    where
        F: FnMut(RawRecord) -> Result<T>,
    {
        let kind = query.kind;
        let filtered = query.path_filter.is_some();

        let mut cursor = self.index.open_cursor(query).await.map_err(|e| {
            LibraryError::index_unavailable(format!("{} query could not be opened", kind), e)
        })?;

        let mut rows = Vec::new();
        while let Some(row) = cursor.next_row().await.map_err(|e| {
            LibraryError::index_unavailable(format!("{} query failed while reading", kind), e)
        })? {
            if row.kind() != kind {
                return Err(LibraryError::UnexpectedRecord {
                    expected: kind,
                    found: row.kind(),
                });
            }
            rows.push(map(self.scrub(row))?);
        }

        debug!(kind = %kind, filtered, rows = rows.len(), "Index query complete");
        Ok(rows)
    }

    fn scrub(&self, row: RawRecord) -> RawRecord {
        match row {
            RawRecord::Track(track) => RawRecord::Track(RawTrack {
                title: self.scrub_text(track.title),
                artist: self.scrub_text(track.artist),
                album: self.scrub_text(track.album),
                ..track
            }),
            RawRecord::Album(album) => RawRecord::Album(RawAlbum {
                title: self.scrub_text(album.title),
                artist: self.scrub_text(album.artist),
                ..album
            }),
            RawRecord::Artist(artist) => RawRecord::Artist(RawArtist {
                name: self.scrub_text(artist.name),
                ..artist
            }),
        }
    }

    fn scrub_text(&self, value: Option<String>) -> Option<String> {
        value.filter(|v| *v != self.unknown_sentinel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_desktop::InMemoryMediaIndex;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use bridge_traits::{IndexCursor, RecordKind};
    use mockall::mock;

    mock! {
        Index {}

        #[async_trait]
        impl MediaIndex for Index {
            async fn open_cursor(&self, query: IndexQuery) -> BridgeResult<Box<dyn IndexCursor>>;
        }
    }

    struct BrokenCursor;

    #[async_trait]
    impl IndexCursor for BrokenCursor {
        async fn next_row(&mut self) -> BridgeResult<Option<RawRecord>> {
            Err(BridgeError::OperationFailed("cursor invalidated".to_string()))
        }
    }

    fn raw_track(id: i64, artist: Option<&str>) -> RawTrack {
        RawTrack {
            id,
            title: Some("<unknown>".to_string()),
            artist: artist.map(str::to_string),
            album: Some("Kind of Blue".to_string()),
            album_id: 1,
            artist_id: 2,
            duration_ms: Some(1000),
            source_path: None,
            relative_path: None,
            is_music: true,
        }
    }

    #[tokio::test]
    async fn test_sentinel_becomes_none() {
        let index = Arc::new(
            InMemoryMediaIndex::new().with_tracks(vec![raw_track(1, Some("<unknown>"))]),
        );
        let client = MediaIndexClient::new(index, "<unknown>");

        let rows = client.query(IndexQuery::tracks()).await.unwrap();
        let RawRecord::Track(track) = &rows[0] else {
            panic!("expected a track row");
        };
        assert_eq!(track.title, None);
        assert_eq!(track.artist, None);
        assert_eq!(track.album.as_deref(), Some("Kind of Blue"));
    }

    #[tokio::test]
    async fn test_empty_index_is_not_an_error() {
        let index = Arc::new(InMemoryMediaIndex::new());
        let client = MediaIndexClient::new(index.clone(), "<unknown>");

        assert!(client.query(IndexQuery::artists()).await.unwrap().is_empty());
        assert_eq!(index.open_cursor_count(), 0);
    }

    #[tokio::test]
    async fn test_open_failure_is_index_unavailable() {
        let mut index = MockIndex::new();
        index
            .expect_open_cursor()
            .times(1)
            .returning(|_| Err(BridgeError::NotAvailable("index offline".to_string())));
        let client = MediaIndexClient::new(Arc::new(index), "<unknown>");

        let err = client.query(IndexQuery::albums()).await.unwrap_err();
        assert!(matches!(err, LibraryError::IndexUnavailable { .. }));
        assert!(err.to_string().contains("index offline"));
    }

    #[tokio::test]
    async fn test_read_failure_is_index_unavailable() {
        let mut index = MockIndex::new();
        index
            .expect_open_cursor()
            .returning(|_| Ok(Box::new(BrokenCursor) as Box<dyn IndexCursor>));
        let client = MediaIndexClient::new(Arc::new(index), "<unknown>");

        let err = client.query(IndexQuery::tracks()).await.unwrap_err();
        assert!(matches!(err, LibraryError::IndexUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_mapping_failure_releases_cursor() {
        let index = Arc::new(
            InMemoryMediaIndex::new().with_tracks(vec![raw_track(1, None), raw_track(2, None)]),
        );
        let client = MediaIndexClient::new(index.clone(), "<unknown>");

        let mut seen = 0;
        let result: Result<Vec<()>> = client
            .query_map(IndexQuery::tracks(), |_| {
                seen += 1;
                Err(LibraryError::InvalidIdentifier {
                    kind: RecordKind::Track,
                    id: -1,
                })
            })
            .await;

        assert!(result.is_err());
        assert_eq!(seen, 1);
        assert_eq!(index.open_cursor_count(), 0);
    }
}
