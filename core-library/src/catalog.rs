//! Full catalog assembly
//!
//! Tracks, albums and artists come from three independent queries. Each
//! row stream is normalized and given catalog ids on its own; nothing is
//! joined. With `concurrent_queries` enabled the three queries run at the
//! same time and the first failure cancels the others.

use bridge_traits::{IndexQuery, MediaIndex, RawRecord, RecordKind};
use core_runtime::config::IndexSettings;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument};

use crate::error::{LibraryError, Result};
use crate::ids::IdentifierAssigner;
use crate::index::MediaIndexClient;
use crate::models::{Album, Artist, Catalog, Track};
use crate::normalize::{CleanAlbum, CleanArtist, CleanTrack, MetadataNormalizer};

pub struct CatalogBuilder {
    client: MediaIndexClient,
    normalizer: MetadataNormalizer,
    concurrent: bool,
}

impl CatalogBuilder {
    pub fn new(index: Arc<dyn MediaIndex>, settings: &IndexSettings) -> Self {
        Self {
            client: MediaIndexClient::new(index, settings.unknown_sentinel.clone()),
            normalizer: MetadataNormalizer::from_settings(settings),
            concurrent: settings.concurrent_queries,
        }
    }

    /// Query, normalize and identify every track, album and artist.
    ///
    /// # Errors
    ///
    /// Fails as a whole if any of the three queries fails; no partial
    /// catalog is returned.
    #[instrument(skip(self), fields(concurrent = self.concurrent))]
    pub async fn build_catalog(&self) -> Result<Catalog> {
        let started = Instant::now();

        let (tracks, albums, artists) = if self.concurrent {
            futures::try_join!(self.tracks(), self.albums(), self.artists())?
        } else {
            (self.tracks().await?, self.albums().await?, self.artists().await?)
        };

        info!(
            tracks = tracks.len(),
            albums = albums.len(),
            artists = artists.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Catalog built"
        );

        Ok(Catalog {
            tracks,
            albums,
            artists,
        })
    }

    async fn tracks(&self) -> Result<Vec<Track>> {
        read_tracks(&self.client, &self.normalizer, IndexQuery::tracks()).await
    }

    async fn albums(&self) -> Result<Vec<Album>> {
        self.client
            .query_map(IndexQuery::albums(), |row| match row {
                RawRecord::Album(raw) => assemble_album(self.normalizer.normalize_album(raw)),
                other => Err(unexpected(RecordKind::Album, &other)),
            })
            .await
    }

    async fn artists(&self) -> Result<Vec<Artist>> {
        self.client
            .query_map(IndexQuery::artists(), |row| match row {
                RawRecord::Artist(raw) => assemble_artist(self.normalizer.normalize_artist(raw)),
                other => Err(unexpected(RecordKind::Artist, &other)),
            })
            .await
    }
}

/// Run a track query through normalization and id assignment
pub(crate) async fn read_tracks(
    client: &MediaIndexClient,
    normalizer: &MetadataNormalizer,
    query: IndexQuery,
) -> Result<Vec<Track>> {
    client
        .query_map(query, |row| match row {
            RawRecord::Track(raw) => assemble_track(normalizer.normalize_track(raw)),
            other => Err(unexpected(RecordKind::Track, &other)),
        })
        .await
}

fn unexpected(expected: RecordKind, row: &RawRecord) -> LibraryError {
    LibraryError::UnexpectedRecord {
        expected,
        found: row.kind(),
    }
}

fn assemble_track(clean: CleanTrack) -> Result<Track> {
    Ok(Track {
        id: IdentifierAssigner::assign(clean.numeric_id, RecordKind::Track)?,
        title: clean.title,
        artist: clean.artist,
        album: clean.album,
        album_id: IdentifierAssigner::assign(clean.album_numeric_id, RecordKind::Album)?,
        artist_id: IdentifierAssigner::assign(clean.artist_numeric_id, RecordKind::Artist)?,
        duration_seconds: clean.duration_seconds,
        source_path: clean.source_path,
        content_reference: clean.content_reference,
        cover_reference: clean.cover_reference,
    })
}

fn assemble_album(clean: CleanAlbum) -> Result<Album> {
    Ok(Album {
        id: IdentifierAssigner::assign(clean.numeric_id, RecordKind::Album)?,
        title: clean.title,
        artist: clean.artist,
        cover_reference: clean.cover_reference,
        year: clean.year,
        num_songs: clean.num_songs,
    })
}

fn assemble_artist(clean: CleanArtist) -> Result<Artist> {
    Ok(Artist {
        id: IdentifierAssigner::assign(clean.numeric_id, RecordKind::Artist)?,
        name: clean.name,
        num_tracks: clean.num_tracks,
        num_albums: clean.num_albums,
        image: String::new(),
    })
}
