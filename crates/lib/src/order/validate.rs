//! Position validation.
//!
//! Validation is pure: it only looks at the group's current [`Bounds`] and the
//! requested [`OrderAction`], so the same inputs always produce the same
//! verdict and nothing is written when a request is rejected.

use std::fmt;

use serde_json::Value;

use super::bounds::Bounds;
use super::errors::OrderError;
use super::OrderAction;

/// Names the position of an action that a validation failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// The single position of an insert or delete.
    Position,
    /// The current position of an item being moved.
    Source,
    /// The requested position of an item being moved.
    Destination,
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Bound::Position => "position",
            Bound::Source => "source",
            Bound::Destination => "destination",
        })
    }
}

/// An action whose positions have been checked and defaults resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidatedAction {
    /// Insert at `position`. `append` is set when no sibling needs to move.
    Insert { position: i64, append: bool },
    /// Move the item at `from` to `to`.
    Move { from: i64, to: i64 },
    /// Remove the item at `position`.
    Delete { position: i64 },
}

/// Check `action` against the group's current `bounds`.
///
/// - insert: `0..=max + 1`, defaulting to `max + 1`
/// - move: both positions in `0..=max`, source checked first
/// - delete: `0..=max`
///
/// Moves and deletes on an empty group are reported as
/// [`OrderError::EmptyGroup`] rather than as out-of-bounds positions.
pub fn validate(bounds: Bounds, action: &OrderAction) -> Result<ValidatedAction, OrderError> {
    match *action {
        OrderAction::Insert { position } => {
            let append_at = bounds.append_position();
            let position = position.unwrap_or(append_at);
            check(Bound::Position, position, append_at)?;
            Ok(ValidatedAction::Insert {
                position,
                append: position == append_at,
            })
        }
        OrderAction::Move {
            old_position,
            new_position,
        } => {
            let max = occupied_max(bounds, "move")?;
            check(Bound::Source, old_position, max)?;
            check(Bound::Destination, new_position, max)?;
            Ok(ValidatedAction::Move {
                from: old_position,
                to: new_position,
            })
        }
        OrderAction::Delete { position } => {
            let max = occupied_max(bounds, "delete")?;
            check(Bound::Position, position, max)?;
            Ok(ValidatedAction::Delete { position })
        }
    }
}

fn occupied_max(bounds: Bounds, action: &'static str) -> Result<i64, OrderError> {
    match bounds {
        Bounds::Empty => Err(OrderError::EmptyGroup { action }),
        Bounds::Max(max) => Ok(max),
    }
}

fn check(bound: Bound, position: i64, max_allowed: i64) -> Result<(), OrderError> {
    if (0..=max_allowed).contains(&position) {
        Ok(())
    } else {
        Err(OrderError::OutOfBounds {
            bound,
            position,
            max_allowed,
        })
    }
}

/// Read a caller-supplied JSON value as a position.
///
/// Accepts non-negative integers, including integral floats such as `2.0`.
/// Negative, fractional, non-numeric and out-of-range values are rejected.
pub fn parse_position(value: &Value, bound: Bound) -> Result<i64, OrderError> {
    let invalid = || OrderError::InvalidPosition {
        bound,
        value: value.to_string(),
    };

    let Value::Number(number) = value else {
        return Err(invalid());
    };

    if let Some(position) = number.as_i64() {
        return if position >= 0 {
            Ok(position)
        } else {
            Err(invalid())
        };
    }

    match number.as_f64() {
        Some(float) if float.fract() == 0.0 && float >= 0.0 && float < i64::MAX as f64 => {
            Ok(float as i64)
        }
        _ => Err(invalid()),
    }
}
