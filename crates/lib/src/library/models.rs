//! Rows and request payloads of the library.
//!
//! Every type serializes with camelCase keys (`categoryId`, `contentKey`),
//! the shape clients of the HTTP API expect.

use serde::{Deserialize, Serialize};

use super::errors::LibraryError;
use crate::ID;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: ID,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: ID,
    pub user_id: ID,
    pub name: String,
    /// `#RRGGBB`
    pub color: String,
    pub order: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: ID,
    pub category_id: ID,
    pub name: String,
    /// Key of the uploaded file in blob storage. Documents with the same
    /// content share it.
    pub content_key: String,
    /// Pages processed so far.
    pub numpages: i64,
    pub completed: bool,
    pub order: i64,
    /// Bookmarks in order. Empty where the query did not load them.
    #[serde(default)]
    pub bookmarks: Vec<Bookmark>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: ID,
    pub document_id: ID,
    pub page: i64,
    /// Offset into the page's audio, in milliseconds.
    pub audiotime: i64,
    pub order: i64,
}

/// A category to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub name: String,
    pub color: String,
    /// Position among the user's categories; appended when absent.
    #[serde(default)]
    pub order: Option<i64>,
}

/// Changes to a category. Absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub order: Option<i64>,
}

/// A freshly uploaded document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDocument {
    #[serde(default)]
    pub name: Option<String>,
    /// Category to file the document under. Falls back to the user's first
    /// category when absent or not owned by the user.
    #[serde(default)]
    pub category_id: Option<ID>,
    pub content_key: String,
    #[serde(default)]
    pub numpages: i64,
}

/// Changes to a document. Absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPatch {
    #[serde(default)]
    pub name: Option<String>,
    /// Position in the document's (new) category.
    #[serde(default)]
    pub order: Option<i64>,
    #[serde(default)]
    pub category_id: Option<ID>,
}

/// A bookmark to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBookmark {
    pub page: i64,
    pub audiotime: i64,
    #[serde(default)]
    pub order: Option<i64>,
}

/// Changes to a bookmark. Absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkPatch {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub audiotime: Option<i64>,
    #[serde(default)]
    pub order: Option<i64>,
}

pub(crate) fn check_name(field: &'static str, name: &str) -> Result<(), LibraryError> {
    if name.trim().is_empty() {
        return Err(LibraryError::invalid(field, "must be a non-empty string"));
    }
    Ok(())
}

pub(crate) fn check_color(color: &str) -> Result<(), LibraryError> {
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());
    if !valid {
        return Err(LibraryError::invalid(
            "color",
            "must be a valid hex color code",
        ));
    }
    Ok(())
}

/// Bookmarks may point at any processed page, or at the page being
/// processed next.
pub(crate) fn check_page(page: i64, numpages: i64) -> Result<(), LibraryError> {
    if page < 0 {
        return Err(LibraryError::invalid("page", "must be a non-negative integer"));
    }
    if page > numpages {
        return Err(LibraryError::invalid(
            "page",
            format!("points beyond the {numpages} pages of the document"),
        ));
    }
    Ok(())
}

pub(crate) fn check_audiotime(audiotime: i64) -> Result<(), LibraryError> {
    if audiotime < 0 {
        return Err(LibraryError::invalid("audiotime", "must be a non-negative number"));
    }
    Ok(())
}

impl NewCategory {
    pub(crate) fn check(&self) -> Result<(), LibraryError> {
        check_name("name", &self.name)?;
        check_color(&self.color)
    }
}

impl CategoryPatch {
    pub(crate) fn check(&self) -> Result<(), LibraryError> {
        if let Some(name) = &self.name {
            check_name("name", name)?;
        }
        if let Some(color) = &self.color {
            check_color(color)?;
        }
        Ok(())
    }
}

impl NewDocument {
    pub(crate) fn check(&self) -> Result<(), LibraryError> {
        if let Some(name) = &self.name {
            check_name("name", name)?;
        }
        check_name("contentKey", &self.content_key)?;
        if self.numpages < 0 {
            return Err(LibraryError::invalid("numpages", "must be a non-negative integer"));
        }
        Ok(())
    }
}

impl DocumentPatch {
    pub(crate) fn check(&self) -> Result<(), LibraryError> {
        if let Some(name) = &self.name {
            check_name("name", name)?;
        }
        Ok(())
    }
}
