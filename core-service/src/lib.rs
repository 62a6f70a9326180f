//! Scanner service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (media index,
//! permission gate, folder picker) into the scan pipeline and exposes the
//! two operations a host bridge calls: `scan_music` and `scan_folder`.
//! Desktop apps typically enable the `desktop-shims` feature (which depends
//! on `bridge-desktop`) and open a SQLite-backed index with
//! [`bootstrap_desktop`].
//!
//! ```ignore
//! use core_service::ScannerService;
//! use core_runtime::config::ScannerConfig;
//!
//! let config = ScannerConfig::builder().media_index(index).build()?;
//! let scanner = ScannerService::new(config);
//!
//! let catalog = scanner.scan_music().await?;
//! let subset = scanner.scan_folder(Some(&folder_uri)).await?;
//! ```

pub mod error;

pub use error::{CoreError, Result};

pub use bridge_traits::{FolderSelection, PermissionState, PermissionStatus};
pub use core_library::{Album, Artist, Catalog, FolderScan, Track};
pub use core_runtime::config::{IndexSettings, ScannerConfig};
pub use core_runtime::events::{CoreEvent, EventBus, ScanEvent, ScanScope};

#[cfg(feature = "desktop-shims")]
pub use bridge_desktop::IndexDatabaseConfig;

use bridge_traits::{FolderPicker, MediaIndex, PermissionGate};
use core_library::{folder_label, CatalogBuilder, FolderScanFilter, LibraryError};
use core_runtime::events::DEFAULT_EVENT_BUFFER_SIZE;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Primary façade exposed to host applications.
///
/// Cheap to clone; clones share the index and the event bus. Scans hold no
/// state between calls, so any number may run at once.
#[derive(Clone)]
pub struct ScannerService {
    config: Arc<ScannerConfig>,
    catalog: Arc<CatalogBuilder>,
    folders: Arc<FolderScanFilter>,
    events: EventBus,
}

impl ScannerService {
    /// Create a new service from a validated configuration.
    pub fn new(config: ScannerConfig) -> Self {
        let catalog = CatalogBuilder::new(Arc::clone(&config.media_index), &config.settings);
        let folders = FolderScanFilter::new(Arc::clone(&config.media_index), &config.settings);

        Self {
            config: Arc::new(config),
            catalog: Arc::new(catalog),
            folders: Arc::new(folders),
            events: EventBus::new(DEFAULT_EVENT_BUFFER_SIZE),
        }
    }

    /// Build a service around `index` with default settings.
    pub fn with_index(index: Arc<dyn MediaIndex>) -> Result<Self> {
        let config = ScannerConfig::builder().media_index(index).build()?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Scan lifecycle events. Nothing is buffered for late subscribers.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Build the full catalog of tracks, albums and artists.
    ///
    /// # Errors
    ///
    /// `CoreError::ScanFailed` carrying the index failure.
    #[instrument(skip(self))]
    pub async fn scan_music(&self) -> Result<Catalog> {
        let scan = ScanRun::start(&self.events, ScanScope::Full);

        match self.catalog.build_catalog().await {
            Ok(catalog) => {
                scan.completed(
                    catalog.tracks.len(),
                    catalog.albums.len(),
                    catalog.artists.len(),
                );
                Ok(catalog)
            }
            Err(err) => {
                let err = CoreError::ScanFailed(err);
                scan.failed(&err);
                Err(err)
            }
        }
    }

    /// Scan the tracks under the folder identified by `folder_uri`.
    ///
    /// # Errors
    ///
    /// - `CoreError::FolderUriRequired` when `folder_uri` is absent or blank;
    ///   the index is not touched and no event is emitted
    /// - `CoreError::FolderScanFailed` carrying the index failure
    #[instrument(skip_all)]
    pub async fn scan_folder(&self, folder_uri: Option<&str>) -> Result<FolderScan> {
        let Some(folder_uri) = folder_uri.map(str::trim).filter(|uri| !uri.is_empty()) else {
            warn!("Folder scan requested without a folder URI");
            return Err(CoreError::FolderUriRequired);
        };

        let scan = ScanRun::start(
            &self.events,
            ScanScope::Folder {
                label: folder_label(folder_uri),
            },
        );

        match self.folders.scan_folder(Some(folder_uri)).await {
            Ok(result) => {
                scan.completed(result.tracks.len(), 0, 0);
                Ok(result)
            }
            Err(LibraryError::MissingFolderReference) => Err(CoreError::FolderUriRequired),
            Err(err) => {
                let err = CoreError::FolderScanFailed(err);
                scan.failed(&err);
                Err(err)
            }
        }
    }

    /// Current permission state, without prompting.
    pub async fn check_permissions(&self) -> Result<PermissionStatus> {
        self.permission_gate()?
            .check_permissions()
            .await
            .map_err(CoreError::Permission)
    }

    /// Prompt for permission if needed.
    pub async fn request_permissions(&self) -> Result<PermissionStatus> {
        let status = self
            .permission_gate()?
            .request_permissions()
            .await
            .map_err(CoreError::Permission)?;

        info!(granted = status.is_granted(), "Permission request finished");
        Ok(status)
    }

    /// Let the user pick a folder to scan.
    ///
    /// # Errors
    ///
    /// `CoreError::FolderSelectionCancelled` when the user dismisses the picker.
    pub async fn choose_folder(&self) -> Result<FolderSelection> {
        self.folder_picker()?
            .choose_folder()
            .await
            .map_err(CoreError::FolderPicker)?
            .ok_or(CoreError::FolderSelectionCancelled)
    }

    fn folder_picker(&self) -> Result<&Arc<dyn FolderPicker>> {
        self.config
            .folder_picker
            .as_ref()
            .ok_or_else(|| CoreError::CapabilityMissing {
                capability: "FolderPicker".to_string(),
                message: "No FolderPicker was injected. Provide the host's document-tree \
                          picker through ScannerConfig::builder().folder_picker()."
                    .to_string(),
            })
    }

    fn permission_gate(&self) -> Result<&Arc<dyn PermissionGate>> {
        self.config
            .permission_gate
            .as_ref()
            .ok_or_else(|| CoreError::CapabilityMissing {
                capability: "PermissionGate".to_string(),
                message: "No PermissionGate was injected. Android: provide the runtime \
                          permission bridge. Desktop: enable the 'desktop-shims' feature."
                    .to_string(),
            })
    }
}

/// Emits the lifecycle events of one scan
struct ScanRun<'a> {
    events: &'a EventBus,
    scan_id: String,
    scope: ScanScope,
    started: Instant,
}

impl<'a> ScanRun<'a> {
    fn start(events: &'a EventBus, scope: ScanScope) -> Self {
        let scan_id = Uuid::new_v4().to_string();
        info!(scan_id = %scan_id, scope = ?scope, "Scan started");

        // No subscribers is fine
        events
            .emit(CoreEvent::Scan(ScanEvent::Started {
                scan_id: scan_id.clone(),
                scope: scope.clone(),
            }))
            .ok();

        Self {
            events,
            scan_id,
            scope,
            started: Instant::now(),
        }
    }

    fn completed(self, tracks: usize, albums: usize, artists: usize) {
        let duration_ms = self.started.elapsed().as_millis() as u64;
        info!(scan_id = %self.scan_id, tracks, albums, artists, duration_ms, "Scan completed");

        self.events
            .emit(CoreEvent::Scan(ScanEvent::Completed {
                scan_id: self.scan_id,
                scope: self.scope,
                tracks: tracks as u64,
                albums: albums as u64,
                artists: artists as u64,
                duration_ms,
            }))
            .ok();
    }

    fn failed(self, err: &CoreError) {
        warn!(scan_id = %self.scan_id, error = %err, "Scan failed");

        self.events
            .emit(CoreEvent::Scan(ScanEvent::Failed {
                scan_id: self.scan_id,
                scope: self.scope,
                message: err.to_string(),
            }))
            .ok();
    }
}

/// Open (or create) a SQLite media index at `database` and build a service
/// over it with the desktop permission gate.
#[cfg(feature = "desktop-shims")]
pub async fn bootstrap_desktop(
    database: IndexDatabaseConfig,
    settings: IndexSettings,
) -> Result<ScannerService> {
    use bridge_desktop::SqliteMediaIndex;

    let index = SqliteMediaIndex::open(database)
        .await
        .map_err(core_runtime::Error::from)?;

    let config = ScannerConfig::builder()
        .media_index(Arc::new(index))
        .settings(settings)
        .build()?;

    Ok(ScannerService::new(config))
}
