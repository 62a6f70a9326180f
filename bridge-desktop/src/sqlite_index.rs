//! Media Index using SQLite
//!
//! Desktop stand-in for Android's `MediaStore`: the `audio`, `albums` and
//! `artists` tables carry the same column names the platform index exposes,
//! so rows read here are shaped exactly like rows read on a device.
//!
//! ## Cursors
//!
//! A cursor walks its result set in `(sort column, _id)` order, `page_size`
//! rows at a time. Each page is a keyset query that resumes after the last
//! row seen, so reading a whole table stays linear. Rows with a NULL sort
//! column come first, matching SQLite's `ORDER BY`, and are read in a pass
//! of their own.
//!
//! A pooled connection is checked out only while a page is fetched and goes
//! back to the pool before any row reaches the caller. A cursor that is read
//! slowly, or abandoned half way, never holds a connection, so concurrent
//! queries share even a single-connection pool.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    media_index::{
        IndexCursor, IndexQuery, MediaIndex, RawAlbum, RawArtist, RawRecord, RawTrack,
        RecordKind,
    },
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::collections::VecDeque;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::config::IndexDatabaseConfig;

const SCHEMA: [&str; 6] = [
    r#"
    CREATE TABLE IF NOT EXISTS audio (
        _id INTEGER PRIMARY KEY,
        title TEXT,
        artist TEXT,
        album TEXT,
        album_id INTEGER,
        artist_id INTEGER,
        duration INTEGER,
        _data TEXT,
        relative_path TEXT,
        is_music INTEGER NOT NULL DEFAULT 1
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS albums (
        _id INTEGER PRIMARY KEY,
        album TEXT,
        artist TEXT,
        numsongs INTEGER,
        minyear
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS artists (
        _id INTEGER PRIMARY KEY,
        artist TEXT,
        number_of_tracks INTEGER,
        number_of_albums INTEGER
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_audio_title ON audio (title, _id)",
    "CREATE INDEX IF NOT EXISTS idx_albums_album ON albums (album, _id)",
    "CREATE INDEX IF NOT EXISTS idx_artists_artist ON artists (artist, _id)",
];

/// Where one kind of row comes from and how it is ordered
struct Listing {
    select: &'static str,
    sort_column: &'static str,
    predicate: &'static str,
}

const TRACKS: Listing = Listing {
    select: "SELECT _id, title, artist, album, album_id, artist_id, duration, _data, \
             relative_path, is_music FROM audio",
    sort_column: "title",
    predicate: "is_music != 0",
};

// instr() rather than LIKE: LIKE folds ASCII case, the folder match must not
const TRACKS_IN_PATH: Listing = Listing {
    select: TRACKS.select,
    sort_column: "title",
    predicate: "is_music != 0 AND (instr(_data, ?) > 0 OR instr(relative_path, ?) > 0)",
};

const ALBUMS: Listing = Listing {
    select: "SELECT _id, album, artist, numsongs, CAST(minyear AS TEXT) AS minyear FROM albums",
    sort_column: "album",
    predicate: "1",
};

const ARTISTS: Listing = Listing {
    select: "SELECT _id, artist, number_of_tracks, number_of_albums FROM artists",
    sort_column: "artist",
    predicate: "1",
};

impl Listing {
    fn for_query(kind: RecordKind, filtered: bool) -> &'static Listing {
        match (kind, filtered) {
            (RecordKind::Track, false) => &TRACKS,
            (RecordKind::Track, true) => &TRACKS_IN_PATH,
            (RecordKind::Album, _) => &ALBUMS,
            (RecordKind::Artist, _) => &ARTISTS,
        }
    }

    /// Page query resuming after `position`. Placeholders, in order: the
    /// predicate's, the position's, then the page size.
    fn page_sql(&self, position: &Position) -> String {
        let (select, column, predicate) = (self.select, self.sort_column, self.predicate);

        match position {
            Position::Unsorted { after_id: None } => format!(
                "{select} WHERE {predicate} AND {column} IS NULL ORDER BY _id ASC LIMIT ?"
            ),
            Position::Unsorted { after_id: Some(_) } => format!(
                "{select} WHERE {predicate} AND {column} IS NULL AND _id > ? \
                 ORDER BY _id ASC LIMIT ?"
            ),
            Position::Sorted { after: None } => format!(
                "{select} WHERE {predicate} AND {column} IS NOT NULL \
                 ORDER BY {column} ASC, _id ASC LIMIT ?"
            ),
            Position::Sorted { after: Some(_) } => format!(
                "{select} WHERE {predicate} AND {column} IS NOT NULL AND ({column}, _id) > (?, ?) \
                 ORDER BY {column} ASC, _id ASC LIMIT ?"
            ),
            Position::Done => String::new(),
        }
    }
}

/// Keyset position of a cursor
#[derive(Debug, Clone, PartialEq, Eq)]
enum Position {
    /// Reading rows whose sort column is NULL
    Unsorted { after_id: Option<i64> },
    /// Reading rows in `(sort column, _id)` order
    Sorted { after: Option<(String, i64)> },
    Done,
}

/// SQLite-backed media index
pub struct SqliteMediaIndex {
    pool: SqlitePool,
    page_size: u32,
}

impl SqliteMediaIndex {
    /// Connect to the database described by `config` and make sure the index
    /// tables exist.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::DatabaseError` if the URL is invalid, the pool
    /// cannot be created or the schema cannot be applied.
    pub async fn open(config: IndexDatabaseConfig) -> Result<Self> {
        info!(
            database_url = %config.database_url,
            max_connections = config.max_connections,
            page_size = config.page_size,
            "Opening SQLite media index"
        );

        let connect_options = SqliteConnectOptions::from_str(&config.database_url)
            .map_err(|e| BridgeError::DatabaseError(format!("Invalid database URL: {}", e)))?
            .create_if_missing(true);

        let mut pool_options = SqlitePoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout);

        if config.database_url.contains(":memory:") {
            // Closing the last connection would discard the database
            pool_options = pool_options.idle_timeout(None).max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(connect_options)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to create connection pool");
                BridgeError::DatabaseError(format!("Connection pool creation failed: {}", e))
            })?;

        let index = Self::from_pool(pool, config.page_size);
        index.ensure_schema().await?;

        Ok(index)
    }

    /// Wrap an existing pool. The schema is not touched.
    pub fn from_pool(pool: SqlitePool, page_size: u32) -> Self {
        Self {
            pool,
            page_size: page_size.max(1),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the index tables if they are missing
    pub async fn ensure_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| BridgeError::DatabaseError(format!("Failed to create table: {}", e)))?;
        }

        debug!("Media index schema ready");
        Ok(())
    }

    /// Store a track row exactly as given, sentinel values included
    pub async fn insert_track(&self, track: &RawTrack) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO audio (
                _id, title, artist, album, album_id, artist_id,
                duration, _data, relative_path, is_music
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(track.id)
        .bind(&track.title)
        .bind(&track.artist)
        .bind(&track.album)
        .bind(track.album_id)
        .bind(track.artist_id)
        .bind(track.duration_ms)
        .bind(&track.source_path)
        .bind(&track.relative_path)
        .bind(i64::from(track.is_music))
        .execute(&self.pool)
        .await
        .map_err(|e| BridgeError::DatabaseError(format!("Failed to insert track: {}", e)))?;

        Ok(())
    }

    pub async fn insert_album(&self, album: &RawAlbum) -> Result<()> {
        sqlx::query("INSERT INTO albums (_id, album, artist, numsongs, minyear) VALUES (?, ?, ?, ?, ?)")
            .bind(album.id)
            .bind(&album.title)
            .bind(&album.artist)
            .bind(album.num_songs)
            .bind(&album.first_year)
            .execute(&self.pool)
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Failed to insert album: {}", e)))?;

        Ok(())
    }

    pub async fn insert_artist(&self, artist: &RawArtist) -> Result<()> {
        sqlx::query(
            "INSERT INTO artists (_id, artist, number_of_tracks, number_of_albums) VALUES (?, ?, ?, ?)",
        )
        .bind(artist.id)
        .bind(&artist.name)
        .bind(artist.num_tracks)
        .bind(artist.num_albums)
        .execute(&self.pool)
        .await
        .map_err(|e| BridgeError::DatabaseError(format!("Failed to insert artist: {}", e)))?;

        Ok(())
    }

    /// Close every pooled connection. Later queries fail.
    pub async fn close(&self) {
        info!("Closing SQLite media index");
        self.pool.close().await;
    }
}

#[async_trait]
impl MediaIndex for SqliteMediaIndex {
    async fn open_cursor(&self, query: IndexQuery) -> Result<Box<dyn IndexCursor>> {
        let needle = match query.kind {
            RecordKind::Track => query.path_filter.map(|filter| filter.needle),
            RecordKind::Album | RecordKind::Artist => None,
        };

        let mut cursor = SqliteCursor {
            pool: self.pool.clone(),
            kind: query.kind,
            listing: Listing::for_query(query.kind, needle.is_some()),
            needle,
            page_size: i64::from(self.page_size),
            position: Position::Unsorted { after_id: None },
            buffer: VecDeque::new(),
            fetched: 0,
        };

        // The first page is read up front so an unreachable index fails here
        cursor.fill_buffer().await.map_err(|e| {
            warn!(kind = %query.kind, error = %e, "Media index unavailable");
            e
        })?;

        debug!(
            kind = %cursor.kind,
            filtered = cursor.needle.is_some(),
            "Opened index cursor"
        );

        Ok(Box::new(cursor))
    }
}

struct SqliteCursor {
    pool: SqlitePool,
    kind: RecordKind,
    listing: &'static Listing,
    needle: Option<String>,
    page_size: i64,
    position: Position,
    buffer: VecDeque<RawRecord>,
    fetched: u64,
}

impl SqliteCursor {
    /// Fetch pages until a row is buffered or the result set is exhausted
    async fn fill_buffer(&mut self) -> Result<()> {
        while self.buffer.is_empty() && self.position != Position::Done {
            self.fetch_page().await?;
        }
        Ok(())
    }

    async fn fetch_page(&mut self) -> Result<()> {
        let sql = self.listing.page_sql(&self.position);

        let mut query = sqlx::query(&sql);
        if let Some(needle) = &self.needle {
            query = query.bind(needle.as_str()).bind(needle.as_str());
        }
        query = match &self.position {
            Position::Unsorted { after_id: Some(id) } => query.bind(*id),
            Position::Sorted {
                after: Some((value, id)),
            } => query.bind(value.as_str()).bind(*id),
            _ => query,
        };

        let rows = {
            let mut conn = self.pool.acquire().await.map_err(|e| {
                BridgeError::DatabaseError(format!("Failed to acquire index connection: {}", e))
            })?;

            query
                .bind(self.page_size)
                .fetch_all(&mut *conn)
                .await
                .map_err(|e| BridgeError::DatabaseError(format!("Query failed: {}", e)))?
        };

        let short_page = (rows.len() as i64) < self.page_size;

        for row in &rows {
            let record = map_row(self.kind, row)
                .map_err(|e| BridgeError::DatabaseError(format!("Malformed index row: {}", e)))?;
            self.advance_past(&record);
            self.buffer.push_back(record);
        }
        self.fetched += rows.len() as u64;

        if short_page {
            self.position = match self.position {
                Position::Unsorted { .. } => Position::Sorted { after: None },
                Position::Sorted { .. } | Position::Done => {
                    debug!(kind = %self.kind, rows = self.fetched, "Index cursor exhausted");
                    Position::Done
                }
            };
        }

        Ok(())
    }

    fn advance_past(&mut self, record: &RawRecord) {
        let (sort_value, id) = match record {
            RawRecord::Track(track) => (&track.title, track.id),
            RawRecord::Album(album) => (&album.title, album.id),
            RawRecord::Artist(artist) => (&artist.name, artist.id),
        };

        match (&mut self.position, sort_value) {
            (Position::Unsorted { after_id }, None) => *after_id = Some(id),
            (Position::Sorted { after }, Some(value)) => *after = Some((value.clone(), id)),
            _ => {}
        }
    }
}

#[async_trait]
impl IndexCursor for SqliteCursor {
    async fn next_row(&mut self) -> Result<Option<RawRecord>> {
        self.fill_buffer().await?;
        Ok(self.buffer.pop_front())
    }
}

fn map_row(kind: RecordKind, row: &SqliteRow) -> std::result::Result<RawRecord, sqlx::Error> {
    let record = match kind {
        RecordKind::Track => RawRecord::Track(RawTrack {
            id: row.try_get("_id")?,
            title: row.try_get("title")?,
            artist: row.try_get("artist")?,
            album: row.try_get("album")?,
            // MediaStore hands out 0 for a missing foreign key
            album_id: row.try_get::<Option<i64>, _>("album_id")?.unwrap_or(0),
            artist_id: row.try_get::<Option<i64>, _>("artist_id")?.unwrap_or(0),
            duration_ms: row.try_get("duration")?,
            source_path: row.try_get("_data")?,
            relative_path: row.try_get("relative_path")?,
            is_music: row.try_get::<i64, _>("is_music")? != 0,
        }),
        RecordKind::Album => RawRecord::Album(RawAlbum {
            id: row.try_get("_id")?,
            title: row.try_get("album")?,
            artist: row.try_get("artist")?,
            num_songs: row.try_get("numsongs")?,
            first_year: row.try_get("minyear")?,
        }),
        RecordKind::Artist => RawRecord::Artist(RawArtist {
            id: row.try_get("_id")?,
            name: row.try_get("artist")?,
            num_tracks: row.try_get("number_of_tracks")?,
            num_albums: row.try_get("number_of_albums")?,
        }),
    };

    Ok(record)
}
