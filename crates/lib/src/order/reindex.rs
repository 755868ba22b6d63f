//! Reindexing: turning a validated action into one bulk shift of siblings.
//!
//! Planning is pure and separate from applying, so the exact set of rows an
//! action touches can be checked without a store.

use super::group::OrderGroup;
use super::repository::GroupRepository;
use super::validate::ValidatedAction;
use crate::Result;

/// A half-open range of order values, `[start, end)`.
///
/// `end == None` means the range extends past the last member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderRange {
    pub start: i64,
    pub end: Option<i64>,
}

impl OrderRange {
    /// `[start, end)`
    pub fn between(start: i64, end: i64) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    /// `[start, ∞)`
    pub fn from(start: i64) -> Self {
        Self { start, end: None }
    }

    pub fn contains(&self, order: i64) -> bool {
        order >= self.start && self.end.is_none_or(|end| order < end)
    }
}

/// One bulk update: add `delta` to every sibling in `range`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shift {
    pub range: OrderRange,
    pub delta: i64,
}

/// The effect of an action on a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reindex {
    /// The position the caller must write (or delete) its own row at.
    pub position: i64,
    /// The sibling shift, if any siblings need to move.
    pub shift: Option<Shift>,
}

/// Work out which siblings an action moves and by how much.
///
/// The moved row itself is never inside the shifted range: for a move from
/// `O` to `N` only the siblings strictly between the two slots, plus the one
/// at `N`, shift by one towards `O`.
pub fn plan(action: &ValidatedAction) -> Reindex {
    match *action {
        ValidatedAction::Insert {
            position,
            append: true,
        } => Reindex {
            position,
            shift: None,
        },
        ValidatedAction::Insert {
            position,
            append: false,
        } => Reindex {
            position,
            shift: Some(Shift {
                range: OrderRange::from(position),
                delta: 1,
            }),
        },
        ValidatedAction::Move { from, to } if from == to => Reindex {
            position: from,
            shift: None,
        },
        ValidatedAction::Move { from, to } if to < from => Reindex {
            position: to,
            shift: Some(Shift {
                range: OrderRange::between(to, from),
                delta: 1,
            }),
        },
        ValidatedAction::Move { from, to } => Reindex {
            position: to,
            shift: Some(Shift {
                range: OrderRange::between(from + 1, to + 1),
                delta: -1,
            }),
        },
        ValidatedAction::Delete { position } => Reindex {
            position,
            shift: Some(Shift {
                range: OrderRange::from(position + 1),
                delta: -1,
            }),
        },
    }
}

/// Apply the planned shift to `group`, returning the number of rows changed.
///
/// Issues at most one call to [`GroupRepository::shift_range`].
pub async fn apply<R>(repo: &mut R, group: &OrderGroup, reindex: &Reindex) -> Result<u64>
where
    R: GroupRepository + ?Sized,
{
    let Some(shift) = reindex.shift else {
        return Ok(0);
    };

    let rows = repo.shift_range(group, shift.range, shift.delta).await?;
    tracing::debug!(
        group = %group,
        start = shift.range.start,
        end = ?shift.range.end,
        delta = shift.delta,
        rows,
        "Shifted siblings"
    );
    Ok(rows)
}
