//! Positional ordering of sibling rows.
//!
//! Categories, documents and bookmarks are kept in user-controlled linear
//! orders. Within one [`OrderGroup`] the `sort_order` values always form the
//! dense sequence `0..N`. This module keeps that true across inserts, moves
//! and deletes:
//!
//! 1. [`GroupRepository::lock_group`] serializes writers of the group
//! 2. [`GroupRepository::max_order`] reads the current [`Bounds`]
//! 3. [`validate`] checks the requested positions against those bounds
//! 4. [`reindex::plan`] picks the siblings to shift, and
//!    [`reindex::apply`] shifts them in a single bulk update
//!
//! [`reorder`] runs all four steps and returns the resolved position. The
//! caller then writes, moves or deletes its own row at that position inside
//! the same unit of work. [`remove`] is the delete variant for callers that
//! identify the row only by its position.
//!
//! ```ignore
//! let position = tx.reorder(&group, OrderAction::append()).await?;
//! insert_row(&mut tx, position).await?;
//! tx.commit().await?;
//! ```

pub mod bounds;
pub mod errors;
pub mod group;
pub mod reindex;
pub mod repository;
pub mod validate;


use serde::{Deserialize, Serialize};

pub use bounds::Bounds;
pub use errors::OrderError;
pub use group::{GroupKind, OrderGroup};
pub use reindex::{OrderRange, Reindex, Shift};
pub use repository::GroupRepository;
pub use validate::{Bound, ValidatedAction, parse_position, validate};

use crate::Result;

/// A change to the membership or arrangement of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum OrderAction {
    /// Add an item at `position`, or at the end when `None`.
    Insert {
        #[serde(default)]
        position: Option<i64>,
    },
    /// Move the item at `old_position` to `new_position`.
    Move {
        old_position: i64,
        new_position: i64,
    },
    /// Remove the item at `position`.
    Delete { position: i64 },
}

impl OrderAction {
    /// Insert at the end of the group.
    pub fn append() -> Self {
        OrderAction::Insert { position: None }
    }

    /// Insert at the end when `position` is `None`, else at `position`.
    pub fn insert(position: Option<i64>) -> Self {
        OrderAction::Insert { position }
    }

    pub fn insert_at(position: i64) -> Self {
        OrderAction::Insert {
            position: Some(position),
        }
    }

    pub fn move_to(old_position: i64, new_position: i64) -> Self {
        OrderAction::Move {
            old_position,
            new_position,
        }
    }

    pub fn delete_at(position: i64) -> Self {
        OrderAction::Delete { position }
    }

    /// Name of the action for logs.
    pub fn name(&self) -> &'static str {
        match self {
            OrderAction::Insert { .. } => "insert",
            OrderAction::Move { .. } => "move",
            OrderAction::Delete { .. } => "delete",
        }
    }
}

/// Reindex `group` for `action` and return the resolved position.
///
/// Nothing is written if validation fails. On success at most one bulk
/// shift has been applied through `repo`; the caller still has to write its
/// own row at the returned position before the unit of work is committed.
pub async fn reorder<R>(repo: &mut R, group: &OrderGroup, action: OrderAction) -> Result<i64>
where
    R: GroupRepository + ?Sized,
{
    repo.lock_group(group).await?;
    let bounds = Bounds::from_max(repo.max_order(group).await?);

    let validated = validate(bounds, &action).inspect_err(|e| {
        tracing::debug!(group = %group, action = action.name(), max = bounds.max(), "Rejected reorder: {e}");
    })?;

    let reindex = reindex::plan(&validated);
    reindex::apply(repo, group, &reindex).await?;

    tracing::debug!(
        group = %group,
        action = action.name(),
        position = reindex.position,
        "Resolved order position"
    );
    Ok(reindex.position)
}

/// Delete the member at `position` and close the gap it leaves.
///
/// Runs the same checks as a [`OrderAction::Delete`] reorder, then removes
/// the row through [`GroupRepository::delete_at`] before shifting the tail,
/// so the row pulled into `position` is never mistaken for the deleted one.
pub async fn remove<R>(repo: &mut R, group: &OrderGroup, position: i64) -> Result<i64>
where
    R: GroupRepository + ?Sized,
{
    repo.lock_group(group).await?;
    let bounds = Bounds::from_max(repo.max_order(group).await?);
    let validated = validate(bounds, &OrderAction::delete_at(position))?;

    let reindex = reindex::plan(&validated);
    let removed = repo.delete_at(group, reindex.position).await?;
    if removed != 1 {
        tracing::warn!(group = %group, position, removed, "Expected to remove exactly one row");
    }
    reindex::apply(repo, group, &reindex).await?;

    tracing::debug!(group = %group, position, "Removed member");
    Ok(reindex.position)
}
