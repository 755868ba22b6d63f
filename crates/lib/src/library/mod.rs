//! User-facing operations on the reader's library.
//!
//! [`Library`] is what request handlers talk to. It checks that every row
//! touched belongs to the calling user, validates request fields, and runs
//! each mutation inside one [`transact`](crate::SqlxBackend::transact) call so
//! the sibling shift and the row write commit together.
//!
//! Operations that act on an existing ordered row lock the row's group before
//! reading its `order`, so the position handed to the ordering engine is never
//! stale.

mod bookmarks;
mod categories;
mod documents;
pub mod errors;
pub mod models;
mod users;

pub use errors::LibraryError;
pub use models::{
    Bookmark, BookmarkPatch, Category, CategoryPatch, Document, DocumentPatch, NewBookmark,
    NewCategory, NewDocument, User,
};

use crate::{Result, SqlxBackend, TransactionOptions, backend::SqlxResultExt};

/// The library of every user, stored in one backend.
#[derive(Debug, Clone)]
pub struct Library {
    backend: SqlxBackend,
    options: TransactionOptions,
}

impl Library {
    /// Create a library over `backend` with default transaction limits.
    pub fn new(backend: SqlxBackend) -> Self {
        Self::with_options(backend, TransactionOptions::default())
    }

    pub fn with_options(backend: SqlxBackend, options: TransactionOptions) -> Self {
        Self { backend, options }
    }

    pub fn backend(&self) -> &SqlxBackend {
        &self.backend
    }

    pub fn options(&self) -> &TransactionOptions {
        &self.options
    }

    /// A pooled connection for read-only queries.
    async fn reader(&self) -> Result<sqlx::pool::PoolConnection<sqlx::Any>> {
        self.backend
            .pool()
            .acquire()
            .await
            .sql_context("Failed to acquire connection")
    }
}
