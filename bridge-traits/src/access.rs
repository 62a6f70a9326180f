//! Access Grant Abstractions
//!
//! The scanner never implements permission prompts or folder pickers itself.
//! Hosts expose them through these traits:
//! - **Android**: runtime `READ_MEDIA_AUDIO` permission, `ACTION_OPEN_DOCUMENT_TREE`
//! - **Desktop**: no runtime permission model; native file dialogs
//!
//! The core assumes permission has already been granted whenever a scan runs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// State of a single permission alias
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    Granted,
    Denied,
    Prompt,
}

/// Permission snapshot reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionStatus {
    /// Read access to the audio media index
    pub audio: PermissionState,
}

impl PermissionStatus {
    pub fn granted() -> Self {
        Self {
            audio: PermissionState::Granted,
        }
    }

    pub fn is_granted(&self) -> bool {
        self.audio == PermissionState::Granted
    }
}

/// Runtime permission gate guarding access to the media index
#[async_trait]
pub trait PermissionGate: Send + Sync {
    /// Report current permission state without prompting
    async fn check_permissions(&self) -> Result<PermissionStatus>;

    /// Prompt the user if needed and report the resulting state
    async fn request_permissions(&self) -> Result<PermissionStatus>;
}

/// Folder chosen through the host's document picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderSelection {
    /// URI-shaped reference the scanner accepts
    pub folder_uri: String,
    /// Path component of the URI, if the host could extract one
    pub folder_path: Option<String>,
}

/// Document picker that yields a folder reference and persists access to it
#[async_trait]
pub trait FolderPicker: Send + Sync {
    /// Show the picker.
    ///
    /// Returns `Ok(None)` when the user cancels.
    async fn choose_folder(&self) -> Result<Option<FolderSelection>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::mock;

    mock! {
        Picker {}

        #[async_trait]
        impl FolderPicker for Picker {
            async fn choose_folder(&self) -> Result<Option<FolderSelection>>;
        }
    }

    #[test]
    fn test_permission_status_granted() {
        assert!(PermissionStatus::granted().is_granted());
        let denied = PermissionStatus {
            audio: PermissionState::Denied,
        };
        assert!(!denied.is_granted());
    }

    #[test]
    fn test_folder_selection_serializes_camel_case() {
        let selection = FolderSelection {
            folder_uri: "content://tree/primary%3AMusic".to_string(),
            folder_path: Some("/tree/primary:Music".to_string()),
        };
        let json = serde_json::to_string(&selection).unwrap();
        assert!(json.contains("\"folderUri\""));
        assert!(json.contains("\"folderPath\""));
    }

    #[tokio::test]
    async fn test_picker_cancellation_is_none() {
        let mut picker = MockPicker::new();
        picker.expect_choose_folder().times(1).returning(|| Ok(None));

        let picker: &dyn FolderPicker = &picker;
        assert!(picker.choose_folder().await.unwrap().is_none());
    }
}
