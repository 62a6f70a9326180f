use bridge_traits::{error::BridgeError, RecordKind};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibraryError {
    /// The media index could not be reached, or a query against it failed
    #[error("Media index unavailable: {message}: {source}")]
    IndexUnavailable {
        message: String,
        #[source]
        source: BridgeError,
    },

    #[error("Folder reference is required")]
    MissingFolderReference,

    #[error("Invalid identifier: {kind} id {id} is negative")]
    InvalidIdentifier { kind: RecordKind, id: i64 },

    /// The index answered a query with a row of another kind
    #[error("Unexpected {found} row in {expected} query")]
    UnexpectedRecord {
        expected: RecordKind,
        found: RecordKind,
    },
}

impl LibraryError {
    pub(crate) fn index_unavailable(message: impl Into<String>, source: BridgeError) -> Self {
        Self::IndexUnavailable {
            message: message.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, LibraryError>;
