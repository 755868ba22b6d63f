//! Current bounds of a group.

/// The occupied range of a group as reported by the aggregate query.
///
/// Because a group is dense, knowing the maximum order is enough to know
/// every occupied slot: `0..=max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bounds {
    /// The group has no members.
    Empty,
    /// The group's highest `sort_order`.
    Max(i64),
}

impl Bounds {
    /// Build bounds from the result of `MAX(sort_order)`.
    pub fn from_max(max: Option<i64>) -> Self {
        match max {
            Some(max) => Bounds::Max(max),
            None => Bounds::Empty,
        }
    }

    /// The maximum order, with an empty group reported as `-1`.
    pub fn max(self) -> i64 {
        match self {
            Bounds::Empty => -1,
            Bounds::Max(max) => max,
        }
    }

    /// The position an appended item receives.
    pub fn append_position(self) -> i64 {
        self.max() + 1
    }

    /// Number of members, assuming the group is dense.
    pub fn len(self) -> i64 {
        self.append_position()
    }

    pub fn is_empty(self) -> bool {
        matches!(self, Bounds::Empty)
    }
}
