//! Transactions against the relational store.
//!
//! A [`Transaction`] is the handle every ordering and row operation runs
//! against. It is created by [`SqlxBackend::begin`] and ends with exactly one
//! [`commit`](Transaction::commit) or [`rollback`](Transaction::rollback);
//! dropping it unfinished rolls it back.
//!
//! Most callers should go through [`SqlxBackend::transact`] instead, which
//! owns the begin/commit/rollback, bounds the whole attempt with a timeout and
//! retries attempts that lost a serialization conflict:
//!
//! ```ignore
//! let position = backend
//!     .transact(&TransactionOptions::default(), move |tx| {
//!         let group = group.clone();
//!         Box::pin(async move { tx.reorder(&group, OrderAction::append()).await })
//!     })
//!     .await?;
//! ```
//!
//! The closure is called once per attempt, so it must own what it captures
//! and clone it into each future.

pub mod errors;
mod groups;


use std::{future::Future, pin::Pin, time::Duration};

pub use errors::TransactionError;

use crate::{
    Result,
    backend::{DbKind, SqlxBackend, SqlxResultExt},
    constants::{DEFAULT_RETRY_BACKOFF, DEFAULT_TRANSACTION_ATTEMPTS, DEFAULT_TRANSACTION_TIMEOUT},
    order::{self, OrderAction, OrderGroup},
};

/// A boxed future borrowing the transaction for `'a`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Limits applied by [`SqlxBackend::transact`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionOptions {
    /// Upper bound on one attempt, from begin to commit.
    pub timeout: Duration,
    /// Attempts made while the store keeps reporting serialization conflicts.
    pub max_attempts: u32,
    /// Delay before the second attempt; attempt `n` waits `n` times this.
    pub retry_backoff: Duration,
}

impl Default for TransactionOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TRANSACTION_TIMEOUT,
            max_attempts: DEFAULT_TRANSACTION_ATTEMPTS,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        }
    }
}

impl TransactionOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_retry_backoff(mut self, retry_backoff: Duration) -> Self {
        self.retry_backoff = retry_backoff;
        self
    }
}

/// An open unit of work against the store.
pub struct Transaction {
    inner: sqlx::Transaction<'static, sqlx::Any>,
    kind: DbKind,
}

impl std::fmt::Debug for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction").field("kind", &self.kind).finish_non_exhaustive()
    }
}

impl Transaction {
    /// The SQL dialect of the store this transaction runs against.
    pub fn kind(&self) -> DbKind {
        self.kind
    }

    /// The connection to run statements on.
    pub(crate) fn conn(&mut self) -> &mut sqlx::AnyConnection {
        &mut self.inner
    }

    /// Make every change in this transaction visible to other writers.
    pub async fn commit(self) -> Result<()> {
        self.inner
            .commit()
            .await
            .sql_context("Failed to commit transaction")
    }

    /// Discard every change in this transaction.
    pub async fn rollback(self) -> Result<()> {
        self.inner
            .rollback()
            .await
            .sql_context("Failed to roll back transaction")
    }

    /// Reindex `group` for `action` and return the position the caller must
    /// write its own row at.
    ///
    /// See [`order::reorder`].
    pub async fn reorder(&mut self, group: &OrderGroup, action: OrderAction) -> Result<i64> {
        order::reorder(self, group, action).await
    }

    /// Delete the member of `group` at `position` and close the gap.
    ///
    /// See [`order::remove`].
    pub async fn remove(&mut self, group: &OrderGroup, position: i64) -> Result<i64> {
        order::remove(self, group, position).await
    }
}

impl SqlxBackend {
    /// Open a transaction.
    ///
    /// On SQLite the transaction takes the database write lock up front
    /// (`BEGIN IMMEDIATE`), waiting out the busy timeout for it. A deferred
    /// transaction that has already read cannot wait for the lock later and
    /// fails with `SQLITE_BUSY` instead.
    pub async fn begin(&self) -> Result<Transaction> {
        let inner = match self.kind() {
            DbKind::Sqlite => self.pool().begin_with("BEGIN IMMEDIATE").await,
            DbKind::Postgres => self.pool().begin().await,
        }
        .sql_context("Failed to begin transaction")?;
        Ok(Transaction {
            inner,
            kind: self.kind(),
        })
    }

    /// Run `f` inside a transaction and commit what it did.
    ///
    /// The transaction is rolled back when `f` fails, when the commit fails,
    /// or when the attempt exceeds `options.timeout`. Attempts that fail with
    /// a serialization conflict are retried from the start, so `f` sees the
    /// store as it is after the conflicting writer committed.
    ///
    /// # Errors
    ///
    /// - [`TransactionError::Timeout`] if an attempt runs out of time
    /// - [`TransactionError::RetriesExhausted`] if every attempt conflicted
    /// - otherwise the error returned by `f` or by the store
    pub async fn transact<T, F>(&self, options: &TransactionOptions, f: F) -> Result<T>
    where
        T: Send,
        F: for<'t> Fn(&'t mut Transaction) -> BoxFuture<'t, Result<T>> + Send + Sync,
    {
        let max_attempts = options.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;

            let err = match tokio::time::timeout(options.timeout, self.attempt(&f)).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(err)) => err,
                Err(_elapsed) => {
                    // The attempt future was dropped with it, rolling the
                    // transaction back.
                    let timeout_ms = u64::try_from(options.timeout.as_millis()).unwrap_or(u64::MAX);
                    tracing::warn!(attempt, timeout_ms, "Transaction timed out");
                    return Err(TransactionError::Timeout { timeout_ms }.into());
                }
            };

            if !err.is_retryable() {
                return Err(err);
            }
            if attempt >= max_attempts {
                tracing::warn!(attempts = attempt, "Giving up on conflicting transaction: {err}");
                return Err(TransactionError::RetriesExhausted {
                    attempts: attempt,
                    source: Box::new(err),
                }
                .into());
            }

            let backoff = options.retry_backoff * attempt;
            tracing::debug!(attempt, backoff_ms = backoff.as_millis() as u64, "Retrying after conflict: {err}");
            tokio::time::sleep(backoff).await;
        }
    }

    async fn attempt<T, F>(&self, f: &F) -> Result<T>
    where
        F: for<'t> Fn(&'t mut Transaction) -> BoxFuture<'t, Result<T>>,
    {
        let mut tx = self.begin().await?;

        match f(&mut tx).await {
            Ok(value) => {
                tx.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!("Rollback failed after {err}: {rollback_err}");
                } else {
                    tracing::debug!("Rolled back transaction: {err}");
                }
                Err(err)
            }
        }
    }
}
