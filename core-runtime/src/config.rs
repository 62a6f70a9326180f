//! # Scanner Configuration
//!
//! Provides configuration management for the music scanner.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a
//! `ScannerConfig` holding the host capabilities and the normalization
//! settings. It enforces fail-fast validation so a scanner is never built
//! without a media index to read from.
//!
//! ## Required Dependencies
//!
//! - `MediaIndex` - The host's queryable index of audio, albums and artists
//!
//! ## Optional Dependencies
//!
//! - `PermissionGate` - Runtime permission check/request
//! - `FolderPicker` - Document-tree picker
//!
//! When the `desktop-shims` feature is enabled and no `PermissionGate` is
//! provided, the desktop gate (always granted) is injected.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{IndexSettings, ScannerConfig};
//! use std::sync::Arc;
//!
//! let config = ScannerConfig::builder()
//!     .media_index(Arc::new(my_index))
//!     .settings(IndexSettings::default().with_concurrent_queries(false))
//!     .build()?;
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::ScannerConfig;
//!
//! let config = ScannerConfig::builder()
//!     .build()
//!     .expect("Should fail - missing media index");
//! ```

use crate::error::{Error, Result};
use bridge_traits::{FolderPicker, MediaIndex, PermissionGate};
use std::sync::Arc;

/// Default base for per-track playable references
pub const DEFAULT_CONTENT_BASE_URI: &str = "content://media/external/audio/media";

/// Default base for album artwork references
pub const DEFAULT_ARTWORK_BASE_URI: &str = "content://media/external/audio/albumart";

/// Placeholder the platform index stores for unknown text values
pub const DEFAULT_UNKNOWN_SENTINEL: &str = "<unknown>";

/// Settings that shape how raw index rows become catalog entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSettings {
    /// Base URI joined with a track id to form its playable reference
    pub content_base_uri: String,

    /// Base URI joined with an album id to form its artwork reference
    pub artwork_base_uri: String,

    /// Text value the index uses to mean "unknown"; treated as absent
    pub unknown_sentinel: String,

    /// Run the track, album and artist queries concurrently
    pub concurrent_queries: bool,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            content_base_uri: DEFAULT_CONTENT_BASE_URI.to_string(),
            artwork_base_uri: DEFAULT_ARTWORK_BASE_URI.to_string(),
            unknown_sentinel: DEFAULT_UNKNOWN_SENTINEL.to_string(),
            concurrent_queries: true,
        }
    }
}

impl IndexSettings {
    pub fn with_content_base_uri(mut self, uri: impl Into<String>) -> Self {
        self.content_base_uri = uri.into();
        self
    }

    pub fn with_artwork_base_uri(mut self, uri: impl Into<String>) -> Self {
        self.artwork_base_uri = uri.into();
        self
    }

    pub fn with_unknown_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.unknown_sentinel = sentinel.into();
        self
    }

    pub fn with_concurrent_queries(mut self, enabled: bool) -> Self {
        self.concurrent_queries = enabled;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.content_base_uri.trim().is_empty() {
            return Err(Error::Config(
                "Content base URI cannot be empty".to_string(),
            ));
        }

        if self.artwork_base_uri.trim().is_empty() {
            return Err(Error::Config(
                "Artwork base URI cannot be empty".to_string(),
            ));
        }

        if self.unknown_sentinel.is_empty() {
            return Err(Error::Config(
                "Unknown sentinel cannot be empty; every absent value would match it".to_string(),
            ));
        }

        Ok(())
    }
}

/// Scanner configuration.
///
/// Use [`ScannerConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct ScannerConfig {
    /// Media index to read rows from (required)
    pub media_index: Arc<dyn MediaIndex>,

    /// Runtime permission gate (optional)
    pub permission_gate: Option<Arc<dyn PermissionGate>>,

    /// Folder picker (optional)
    pub folder_picker: Option<Arc<dyn FolderPicker>>,

    pub settings: IndexSettings,
}

impl std::fmt::Debug for ScannerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScannerConfig")
            .field("media_index", &"MediaIndex { ... }")
            .field(
                "permission_gate",
                &self
                    .permission_gate
                    .as_ref()
                    .map(|_| "PermissionGate { ... }"),
            )
            .field(
                "folder_picker",
                &self.folder_picker.as_ref().map(|_| "FolderPicker { ... }"),
            )
            .field("settings", &self.settings)
            .finish()
    }
}

impl ScannerConfig {
    pub fn builder() -> ScannerConfigBuilder {
        ScannerConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<()> {
        self.settings.validate()
    }
}

fn media_index_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "MediaIndex".to_string(),
        message: "MediaIndex implementation is required to scan the music library. \
                  Desktop: open a SqliteMediaIndex or build an InMemoryMediaIndex from bridge-desktop. \
                  Android: inject the MediaStore-backed index from the host plugin."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_permission_gate() -> Option<Arc<dyn PermissionGate>> {
    use bridge_desktop::DesktopPermissionGate;

    let gate: Arc<dyn PermissionGate> = Arc::new(DesktopPermissionGate::new());
    Some(gate)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_permission_gate() -> Option<Arc<dyn PermissionGate>> {
    None
}

/// Builder for [`ScannerConfig`]
#[derive(Default)]
pub struct ScannerConfigBuilder {
    media_index: Option<Arc<dyn MediaIndex>>,
    permission_gate: Option<Arc<dyn PermissionGate>>,
    folder_picker: Option<Arc<dyn FolderPicker>>,
    settings: Option<IndexSettings>,
}

impl ScannerConfigBuilder {
    pub fn media_index(mut self, index: Arc<dyn MediaIndex>) -> Self {
        self.media_index = Some(index);
        self
    }

    pub fn permission_gate(mut self, gate: Arc<dyn PermissionGate>) -> Self {
        self.permission_gate = Some(gate);
        self
    }

    pub fn folder_picker(mut self, picker: Arc<dyn FolderPicker>) -> Self {
        self.folder_picker = Some(picker);
        self
    }

    pub fn settings(mut self, settings: IndexSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// - `Error::CapabilityMissing` if no media index was provided
    /// - `Error::Config` if the settings are invalid
    pub fn build(self) -> Result<ScannerConfig> {
        let media_index = self.media_index.ok_or_else(media_index_missing_error)?;

        let permission_gate = match self.permission_gate {
            Some(gate) => Some(gate),
            None => provide_default_permission_gate(),
        };

        let config = ScannerConfig {
            media_index,
            permission_gate,
            folder_picker: self.folder_picker,
            settings: self.settings.unwrap_or_default(),
        };

        config.validate()?;

        Ok(config)
    }
}
