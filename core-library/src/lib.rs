//! # Library Scan Module
//!
//! Builds a normalized, cross-referenced music catalog from the host's
//! media index.
//!
//! ## Overview
//!
//! ```text
//! MediaIndex ──> MediaIndexClient ──> MetadataNormalizer ──> IdentifierAssigner
//!                (raw rows, sentinel     (fallback text,        (t_ / a_ / ar_)
//!                 scrubbed)               seconds, locators)           │
//!                                                                      ▼
//!                                         CatalogBuilder / FolderScanFilter
//! ```
//!
//! - [`CatalogBuilder`] queries tracks, albums and artists independently and
//!   fails as a whole if any query fails.
//! - [`FolderScanFilter`] returns the tracks whose location contains a label
//!   derived from a folder reference.
//!
//! Every scan is stateless: entities are rebuilt from the index on each call.

pub mod catalog;
pub mod error;
pub mod folder;
pub mod ids;
pub mod index;
pub mod models;
pub mod normalize;

pub use catalog::CatalogBuilder;
pub use error::{LibraryError, Result};
pub use folder::{folder_label, FolderScanFilter};
pub use ids::IdentifierAssigner;
pub use index::MediaIndexClient;
pub use models::{Album, Artist, Catalog, FolderScan, Track};
pub use normalize::MetadataNormalizer;
