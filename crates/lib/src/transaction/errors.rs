//! Transaction specific errors
//!
//! Failures of the unit of work itself, as opposed to failures of the
//! statements run inside it.

use thiserror::Error;

/// Errors raised by the transaction coordinator.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum TransactionError {
    /// The attempt did not finish within the configured timeout and was
    /// rolled back.
    #[error("Transaction timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Every attempt hit a serialization conflict.
    #[error("Transaction failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<crate::Error>,
    },
}

impl TransactionError {
    /// Check if the transaction ran out of time.
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransactionError::Timeout { .. })
    }

    /// Check if the transaction gave up retrying conflicts.
    pub fn is_retries_exhausted(&self) -> bool {
        matches!(self, TransactionError::RetriesExhausted { .. })
    }
}

impl From<TransactionError> for crate::Error {
    fn from(err: TransactionError) -> Self {
        crate::Error::Transaction(err)
    }
}
