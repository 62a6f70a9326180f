//! # Desktop Bridge Implementations
//!
//! Default implementations of the scanner's bridge traits for desktop
//! platforms (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `MediaIndex` backed by a SQLite database laid out like Android's
//!   `MediaStore` audio tables ([`SqliteMediaIndex`])
//! - `MediaIndex` backed by in-memory rows, for tests and demo data
//!   ([`InMemoryMediaIndex`])
//! - `PermissionGate` that always reports access as granted, since desktop
//!   hosts have no runtime media permission ([`DesktopPermissionGate`])
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{IndexDatabaseConfig, SqliteMediaIndex};
//! use bridge_traits::media_index::{IndexQuery, MediaIndex};
//!
//! #[tokio::main]
//! async fn main() {
//!     let index = SqliteMediaIndex::open(IndexDatabaseConfig::new("media.db"))
//!         .await
//!         .expect("index");
//!     let mut cursor = index.open_cursor(IndexQuery::tracks()).await.expect("cursor");
//!     while let Some(row) = cursor.next_row().await.expect("row") {
//!         println!("{:?}", row);
//!     }
//! }
//! ```

mod config;
mod memory_index;
mod permissions;
mod sqlite_index;

pub use config::IndexDatabaseConfig;
pub use memory_index::InMemoryMediaIndex;
pub use permissions::DesktopPermissionGate;
pub use sqlite_index::SqliteMediaIndex;
