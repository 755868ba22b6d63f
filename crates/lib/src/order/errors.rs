//! Errors raised while validating and applying order changes.

use thiserror::Error;

use super::validate::Bound;

/// Errors that can occur while reordering a group.
///
/// Every variant is raised before any row is written, so a failed reorder
/// never leaves partial changes behind.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum OrderError {
    /// A position lies outside the range permitted for the action.
    #[error("{bound} position {position} is out of bounds (allowed 0..={max_allowed})")]
    OutOfBounds {
        /// Which of the action's positions was rejected
        bound: Bound,
        /// The rejected position
        position: i64,
        /// The largest position the action accepts
        max_allowed: i64,
    },

    /// A position could not be read as a non-negative integer.
    #[error("{bound} position must be a non-negative integer, got {value}")]
    InvalidPosition {
        /// Which of the action's positions was rejected
        bound: Bound,
        /// The value as supplied by the caller
        value: String,
    },

    /// A move or delete was requested on a group with no members.
    ///
    /// Callers only issue these for rows they have just read, so reaching this
    /// means the caller and the store disagree about the group.
    #[error("Cannot {action} in an empty group")]
    EmptyGroup {
        /// The attempted action
        action: &'static str,
    },
}

impl OrderError {
    /// Check if the caller supplied a position that cannot be honoured.
    pub fn is_out_of_bounds(&self) -> bool {
        matches!(
            self,
            OrderError::OutOfBounds { .. } | OrderError::InvalidPosition { .. }
        )
    }

    /// Check if this error is the caller's fault and safe to report back.
    pub fn is_user_error(&self) -> bool {
        self.is_out_of_bounds()
    }

    /// Check if this error indicates a bug in the calling code.
    pub fn is_logic_error(&self) -> bool {
        matches!(self, OrderError::EmptyGroup { .. })
    }

    /// The bound that was violated, if any.
    pub fn bound(&self) -> Option<Bound> {
        match self {
            OrderError::OutOfBounds { bound, .. } | OrderError::InvalidPosition { bound, .. } => {
                Some(*bound)
            }
            _ => None,
        }
    }
}

impl From<OrderError> for crate::Error {
    fn from(err: OrderError) -> Self {
        crate::Error::Order(err)
    }
}
