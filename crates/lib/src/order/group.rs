//! Ordering domains.
//!
//! An [`OrderGroup`] names the set of sibling rows whose `sort_order` values
//! must stay dense. The set of groups is closed: each variant maps to exactly
//! one table, one grouping column and one parent table, resolved once here
//! instead of being passed around as free-form strings.

use std::fmt;

use crate::ID;

/// The kind of sibling rows in a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKind {
    /// Categories owned by one user.
    Categories,
    /// Documents filed under one category.
    Documents,
    /// Bookmarks placed in one document.
    Bookmarks,
}

impl GroupKind {
    /// Table holding the sibling rows.
    pub const fn table(self) -> &'static str {
        match self {
            GroupKind::Categories => "categories",
            GroupKind::Documents => "documents",
            GroupKind::Bookmarks => "bookmarks",
        }
    }

    /// Column whose value identifies the group.
    pub const fn group_column(self) -> &'static str {
        match self {
            GroupKind::Categories => "user_id",
            GroupKind::Documents => "category_id",
            GroupKind::Bookmarks => "document_id",
        }
    }

    /// Table holding the row that owns the group.
    pub const fn parent_table(self) -> &'static str {
        match self {
            GroupKind::Categories => "users",
            GroupKind::Documents => "categories",
            GroupKind::Bookmarks => "documents",
        }
    }

    /// Short label used in log fields and `Display`.
    pub const fn label(self) -> &'static str {
        match self {
            GroupKind::Categories => "categories-of",
            GroupKind::Documents => "documents-of",
            GroupKind::Bookmarks => "bookmarks-of",
        }
    }
}

/// A single ordering domain, identified by its kind and the parent's ID.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OrderGroup {
    /// All categories of a user.
    CategoriesOf { user_id: ID },
    /// All documents in a category.
    DocumentsOf { category_id: ID },
    /// All bookmarks in a document.
    BookmarksOf { document_id: ID },
}

impl OrderGroup {
    pub fn categories_of(user_id: impl Into<ID>) -> Self {
        OrderGroup::CategoriesOf {
            user_id: user_id.into(),
        }
    }

    pub fn documents_of(category_id: impl Into<ID>) -> Self {
        OrderGroup::DocumentsOf {
            category_id: category_id.into(),
        }
    }

    pub fn bookmarks_of(document_id: impl Into<ID>) -> Self {
        OrderGroup::BookmarksOf {
            document_id: document_id.into(),
        }
    }

    /// The kind of siblings in this group.
    pub fn kind(&self) -> GroupKind {
        match self {
            OrderGroup::CategoriesOf { .. } => GroupKind::Categories,
            OrderGroup::DocumentsOf { .. } => GroupKind::Documents,
            OrderGroup::BookmarksOf { .. } => GroupKind::Bookmarks,
        }
    }

    /// The parent ID shared by every member of the group.
    pub fn id(&self) -> &ID {
        match self {
            OrderGroup::CategoriesOf { user_id } => user_id,
            OrderGroup::DocumentsOf { category_id } => category_id,
            OrderGroup::BookmarksOf { document_id } => document_id,
        }
    }
}

impl fmt::Display for OrderGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind().label(), self.id())
    }
}
