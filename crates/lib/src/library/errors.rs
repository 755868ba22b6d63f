//! Error types for the library operations.

use thiserror::Error;

/// Errors raised by [`Library`](super::Library) operations.
///
/// Missing rows and rows owned by another user are reported the same way,
/// so callers cannot discover other users' data.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("User not found: {id}")]
    UserNotFound { id: String },

    #[error("Category not found: {id}")]
    CategoryNotFound { id: String },

    #[error("Document not found: {id}")]
    DocumentNotFound { id: String },

    #[error("Bookmark {id} not found on document {document_id}")]
    BookmarkNotFound { id: String, document_id: String },

    /// A field of the request failed validation.
    #[error("Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl LibraryError {
    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LibraryError::UserNotFound { .. }
                | LibraryError::CategoryNotFound { .. }
                | LibraryError::DocumentNotFound { .. }
                | LibraryError::BookmarkNotFound { .. }
        )
    }

    /// Check if this error was caused by the caller's input.
    pub fn is_user_error(&self) -> bool {
        matches!(self, LibraryError::InvalidField { .. })
    }

    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        LibraryError::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

impl From<LibraryError> for crate::Error {
    fn from(err: LibraryError) -> Self {
        crate::Error::Library(err)
    }
}
