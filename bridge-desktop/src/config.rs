//! Connection settings for the SQLite-backed media index

use std::path::PathBuf;
use std::time::Duration;

/// Database configuration for [`SqliteMediaIndex`](crate::SqliteMediaIndex)
#[derive(Debug, Clone)]
pub struct IndexDatabaseConfig {
    /// Database file path or connection string
    pub database_url: String,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Maximum number of connections in the pool.
    ///
    /// Cursors hold a connection only while a page is being fetched, so this
    /// bounds concurrent page reads, not the number of open cursors.
    pub max_connections: u32,

    /// Maximum time to wait for a connection
    pub acquire_timeout: Duration,

    /// Rows fetched per round trip while a cursor is being consumed
    pub page_size: u32,
}

impl IndexDatabaseConfig {
    /// Create a configuration for the database file at `database_path`
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        let path = database_path.into();
        let database_url = format!("sqlite:{}", path.to_string_lossy().replace('\\', "/"));

        Self {
            database_url,
            min_connections: 1,
            max_connections: 4,
            acquire_timeout: Duration::from_secs(30),
            page_size: 256,
        }
    }

    /// Create a configuration for an in-memory database.
    ///
    /// SQLite gives each connection its own private in-memory database, so
    /// the pool is pinned to a single connection. Cursors take turns on it
    /// page by page.
    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            min_connections: 1,
            max_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            page_size: 256,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }
}

impl Default for IndexDatabaseConfig {
    fn default() -> Self {
        Self::in_memory()
    }
}
