//! Storage seam for the ordering engine.

use async_trait::async_trait;

use super::group::OrderGroup;
use super::reindex::OrderRange;
use crate::{ID, Result};

/// Access to the sibling rows of ordering groups.
///
/// Every method runs against one open unit of work (a transaction for SQL
/// stores). The engine calls [`lock_group`](Self::lock_group) before reading
/// bounds, so implementations that share the store between writers must make
/// that call block or fail for as long as another unit of work is mutating
/// the same group.
///
/// Only the ordering engine and the callers it hands a resolved position to
/// should call the mutating methods; writing `sort_order` any other way breaks
/// the dense ordering of the group.
#[async_trait]
pub trait GroupRepository: Send {
    /// Serialize further access to `group` behind this unit of work.
    async fn lock_group(&mut self, group: &OrderGroup) -> Result<()>;

    /// The highest `sort_order` in `group`, or `None` if it has no members.
    async fn max_order(&mut self, group: &OrderGroup) -> Result<Option<i64>>;

    /// Add `delta` to the order of every member whose order lies in `range`.
    ///
    /// Returns the number of rows changed.
    async fn shift_range(&mut self, group: &OrderGroup, range: OrderRange, delta: i64)
    -> Result<u64>;

    /// Set the order of member `item` to `position`.
    async fn write_at(&mut self, group: &OrderGroup, item: &ID, position: i64) -> Result<()>;

    /// Remove the member currently at `position`.
    ///
    /// Returns the number of rows removed.
    async fn delete_at(&mut self, group: &OrderGroup, position: i64) -> Result<u64>;
}
