//! Storage error types for the Listenink backend.

use thiserror::Error;

/// Errors that can occur while talking to the relational store.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BackendError {
    /// A sqlx operation failed.
    #[error("SQL error: {reason}")]
    SqlxError {
        /// Context and message of the failure
        reason: String,
        /// The underlying sqlx error, when there is one
        #[source]
        source: Option<sqlx::Error>,
    },

    /// The store aborted the transaction because it conflicted with another
    /// writer. The whole transaction can be retried from the start.
    #[error("Serialization conflict: {reason}")]
    SerializationConflict {
        /// Context and message of the failure
        reason: String,
        /// The underlying sqlx error
        #[source]
        source: sqlx::Error,
    },

    /// A row that the caller just read is gone.
    #[error("Row {id} not found in {table}")]
    RowNotFound {
        /// Table the row was expected in
        table: &'static str,
        /// ID of the missing row
        id: String,
    },

    /// The stored schema is newer or older than any known migration path.
    #[error("Unknown migration path: v{from} to v{to}")]
    UnknownMigration {
        /// Version found in the database
        from: i64,
        /// Version this build expects
        to: i64,
    },
}

impl BackendError {
    /// Check if retrying the whole transaction may succeed.
    pub fn is_serialization_conflict(&self) -> bool {
        matches!(self, BackendError::SerializationConflict { .. })
    }

    /// Check if a row the caller expected has gone.
    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::RowNotFound { .. })
    }

    /// Check if this error indicates stored state disagreeing with the caller.
    pub fn is_integrity_error(&self) -> bool {
        matches!(self, BackendError::RowNotFound { .. })
    }

    /// Check if this error came from the schema/migration system.
    pub fn is_schema_error(&self) -> bool {
        matches!(self, BackendError::UnknownMigration { .. })
    }
}

impl From<BackendError> for crate::Error {
    fn from(err: BackendError) -> Self {
        crate::Error::Backend(err)
    }
}

/// Whether a sqlx error is the store refusing to serialize two transactions.
///
/// PostgreSQL reports `serialization_failure` (40001) or `deadlock_detected`
/// (40P01). SQLite reports `SQLITE_BUSY` (5) or `SQLITE_LOCKED` (6), possibly
/// as an extended code whose low byte is the primary code.
pub(crate) fn is_serialization_failure(err: &sqlx::Error) -> bool {
    let Some(db_err) = err.as_database_error() else {
        return false;
    };
    let Some(code) = db_err.code() else {
        return false;
    };

    // SQLSTATE codes are always five characters; SQLite codes are shorter.
    if code.len() == 5 {
        return code == "40001" || code == "40P01";
    }
    code.parse::<i64>()
        .is_ok_and(|code| matches!(code & 0xff, 5 | 6))
}
