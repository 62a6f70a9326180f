//! # Host Bridge Traits
//!
//! Capability traits that each host platform implements for the music scanner.
//!
//! ## Overview
//!
//! This crate defines the contract between the scanner core and
//! platform-specific implementations. The core never talks to an operating
//! system API directly; it asks for a capability and works with whatever the
//! host injects.
//!
//! ## Traits
//!
//! ### Media index
//! - [`MediaIndex`](media_index::MediaIndex) - Query tracks, albums and artists
//! - [`IndexCursor`](media_index::IndexCursor) - Forward-only row handle, released on drop
//!
//! ### Access grants
//! - [`PermissionGate`](access::PermissionGate) - Runtime permission check/request
//! - [`FolderPicker`](access::FolderPicker) - Document-tree picker yielding a folder URI
//!
//! ### Utilities
//! - [`LoggerSink`](logger::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop`    | ✅ SQLite index + fixture |
//! | Android  | Host plugin         | 📋 Planned |
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! should convert platform errors into it and keep the message actionable;
//! the core attaches it as the cause of whatever it reports to the caller.
//!
//! ## Thread Safety
//!
//! Capabilities are `Send + Sync` so that a single index can serve several
//! scans at once. Cursors are `Send` only; each belongs to one query.

pub mod access;
pub mod error;
pub mod logger;
pub mod media_index;

pub use error::BridgeError;

// Re-export commonly used types
pub use access::{FolderPicker, FolderSelection, PermissionGate, PermissionState, PermissionStatus};
pub use logger::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use media_index::{
    IndexCursor, IndexQuery, MediaIndex, PathFilter, RawAlbum, RawArtist, RawRecord, RawTrack,
    RecordKind,
};
