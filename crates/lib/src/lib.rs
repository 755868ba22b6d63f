//!
//! Listenink: user-ordered categories, documents and bookmarks.
//! This library provides the storage layer behind the Listenink reader.
//!
//! ## Core Concepts
//!
//! * **Order groups (`order::OrderGroup`)**: A set of sibling rows whose `sort_order` values always form the dense sequence `0..N`. The categories of a user, the documents of a category and the bookmarks of a document are each one group.
//! * **Ordering engine (`order`)**: Validates insert, move and delete positions against a group's bounds and shifts the siblings in one bulk update. The caller writes its own row at the resolved position.
//! * **Backends (`backend::SqlxBackend`)**: SQLite or PostgreSQL storage through sqlx.
//! * **Transactions (`transaction::Transaction`)**: The unit of work the engine and the row writes share, with a scoped, retrying entry point in `SqlxBackend::transact`.
//! * **Library (`library::Library`)**: The user-facing operations on users, categories, documents and bookmarks.

pub mod backend;
pub mod constants;
pub mod id;
pub mod library;
pub mod order;
pub mod transaction;

pub use backend::SqlxBackend;
pub use id::ID;
pub use library::Library;
pub use order::{OrderAction, OrderGroup};
pub use transaction::{Transaction, TransactionOptions};

/// Result type used throughout the Listenink library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Listenink library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured ordering errors from the order module
    #[error(transparent)]
    Order(order::OrderError),

    /// Structured storage errors from the backend module
    #[error(transparent)]
    Backend(backend::BackendError),

    /// Structured coordinator errors from the transaction module
    #[error(transparent)]
    Transaction(transaction::TransactionError),

    /// Structured domain errors from the library module
    #[error(transparent)]
    Library(library::LibraryError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Order(_) => "order",
            Error::Backend(_) => "backend",
            Error::Transaction(_) => "transaction",
            Error::Library(_) => "library",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error was caused by the caller's input.
    ///
    /// These errors are raised before anything is written and their message
    /// is safe to show to the caller.
    pub fn is_user_error(&self) -> bool {
        match self {
            Error::Order(order_err) => order_err.is_user_error(),
            Error::Library(library_err) => library_err.is_user_error(),
            _ => false,
        }
    }

    /// Check if this error indicates a resource was not found.
    ///
    /// Includes rows deleted by a concurrent writer after this operation
    /// first read them.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Library(library_err) => library_err.is_not_found(),
            Error::Backend(backend_err) => backend_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if retrying the whole operation from the start may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Backend(backend_err) => backend_err.is_serialization_conflict(),
            _ => false,
        }
    }

    /// Check if the operation ran out of time.
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Transaction(tx_err) => tx_err.is_timeout(),
            _ => false,
        }
    }

    /// Check if this error indicates a bug in the calling code.
    pub fn is_logic_error(&self) -> bool {
        match self {
            Error::Order(order_err) => order_err.is_logic_error(),
            Error::Serialize(_) => true,
            _ => false,
        }
    }

    /// Check if this error is database/backend-related.
    pub fn is_database_error(&self) -> bool {
        matches!(self, Error::Backend(_))
    }
}
