//! Namespaced catalog identifiers
//!
//! The index numbers tracks, albums and artists independently, so the same
//! numeric id can name three unrelated records. A per-kind prefix keeps
//! them apart once they share a catalog.

use bridge_traits::RecordKind;

use crate::error::{LibraryError, Result};

pub struct IdentifierAssigner;

impl IdentifierAssigner {
    pub fn prefix(kind: RecordKind) -> &'static str {
        match kind {
            RecordKind::Track => "t_",
            RecordKind::Album => "a_",
            RecordKind::Artist => "ar_",
        }
    }

    /// Prefix `numeric_id` with the namespace of `kind`.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::InvalidIdentifier` for a negative id.
    pub fn assign(numeric_id: i64, kind: RecordKind) -> Result<String> {
        if numeric_id < 0 {
            return Err(LibraryError::InvalidIdentifier {
                kind,
                id: numeric_id,
            });
        }

        Ok(format!("{}{}", Self::prefix(kind), numeric_id))
    }
}
