use bridge_traits::BridgeError;
use core_library::LibraryError;
use thiserror::Error;

/// Rejections surfaced to the host bridge.
///
/// The display text is what the calling application receives as the
/// rejection message.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Core initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },

    #[error("Failed to scan music: {0}")]
    ScanFailed(#[source] LibraryError),

    #[error("Folder URI is required")]
    FolderUriRequired,

    #[error("Folder scan failed: {0}")]
    FolderScanFailed(#[source] LibraryError),

    #[error("User cancelled folder selection")]
    FolderSelectionCancelled,

    #[error("Permission check failed: {0}")]
    Permission(#[source] BridgeError),

    #[error("Folder selection failed: {0}")]
    FolderPicker(#[source] BridgeError),
}

impl From<core_runtime::Error> for CoreError {
    fn from(err: core_runtime::Error) -> Self {
        match err {
            core_runtime::Error::CapabilityMissing {
                capability,
                message,
            } => CoreError::CapabilityMissing {
                capability,
                message,
            },
            other => CoreError::InitializationFailed(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
