//! Documents, ordered per category.
//!
//! Besides the user-facing operations this holds the hooks the upload
//! pipeline reports progress through.

use sqlx::AnyConnection;

use super::{
    Library,
    bookmarks::{fetch_bookmarks, fetch_bookmarks_of_user, insert_bookmark},
    categories::{fetch_categories, fetch_category, insert_category},
    errors::LibraryError,
    models::{Document, DocumentPatch, NewBookmark, NewCategory, NewDocument},
    users::fetch_user,
};
use crate::{
    ID, Result, Transaction,
    backend::SqlxResultExt,
    constants::{DEFAULT_CATEGORY_COLOR, DEFAULT_CATEGORY_NAME, DEFAULT_DOCUMENT_NAME},
    order::{GroupRepository, OrderAction, OrderGroup},
};

type DocumentRow = (String, String, String, String, i64, i64, i64);

const COLUMNS: &str =
    "d.id, d.category_id, d.name, d.content_key, d.numpages, d.completed, d.sort_order";

fn from_row(
    (id, category_id, name, content_key, numpages, completed, order): DocumentRow,
) -> Document {
    Document {
        id: id.into(),
        category_id: category_id.into(),
        name,
        content_key,
        numpages,
        completed: completed != 0,
        order,
        bookmarks: Vec::new(),
    }
}

/// Read a document without its bookmarks.
///
/// With an `owner`, documents in another user's categories are reported as
/// missing.
pub(super) async fn fetch_document(
    conn: &mut AnyConnection,
    owner: Option<&ID>,
    id: &ID,
) -> Result<Document> {
    let row: Option<DocumentRow> = match owner {
        Some(user_id) => {
            let sql = format!(
                "SELECT {COLUMNS} FROM documents d JOIN categories c ON c.id = d.category_id \
                 WHERE d.id = $1 AND c.user_id = $2"
            );
            sqlx::query_as::<_, DocumentRow>(&sql)
                .bind(id.as_str())
                .bind(user_id.as_str())
                .fetch_optional(conn)
                .await
        }
        None => {
            let sql = format!("SELECT {COLUMNS} FROM documents d WHERE d.id = $1");
            sqlx::query_as::<_, DocumentRow>(&sql)
                .bind(id.as_str())
                .fetch_optional(conn)
                .await
        }
    }
    .sql_context("Failed to read document")?;

    row.map(from_row).ok_or_else(|| {
        LibraryError::DocumentNotFound {
            id: id.to_string(),
        }
        .into()
    })
}

/// Read a document after locking the group it is in.
///
/// The document can change category between the first read and the lock,
/// in which case the new group is locked too.
async fn locked_document(tx: &mut Transaction, owner: Option<&ID>, id: &ID) -> Result<Document> {
    let mut document = fetch_document(tx.conn(), owner, id).await?;
    loop {
        tx.lock_group(&OrderGroup::documents_of(&document.category_id))
            .await?;
        let current = fetch_document(tx.conn(), owner, id).await?;
        if current.category_id == document.category_id {
            return Ok(current);
        }
        document = current;
    }
}

/// Remove a locked document, its bookmarks and its place in the category.
async fn delete_locked(tx: &mut Transaction, document: &Document) -> Result<()> {
    tx.lock_group(&OrderGroup::bookmarks_of(&document.id))
        .await?;
    let bookmarks = sqlx::query("DELETE FROM bookmarks WHERE document_id = $1")
        .bind(document.id.as_str())
        .execute(tx.conn())
        .await
        .sql_context("Failed to delete bookmarks of document")?
        .rows_affected();

    let group = OrderGroup::documents_of(&document.category_id);
    tx.reorder(&group, OrderAction::delete_at(document.order))
        .await?;
    sqlx::query("DELETE FROM documents WHERE id = $1")
        .bind(document.id.as_str())
        .execute(tx.conn())
        .await
        .sql_context("Failed to delete document")?;

    tracing::debug!(document = %document.id, bookmarks, "Deleted document");
    Ok(())
}

async fn create_in(tx: &mut Transaction, user_id: ID, new: NewDocument) -> Result<Document> {
    fetch_user(tx.conn(), &user_id).await?;
    // Concurrent first uploads must agree on a single default category.
    tx.lock_group(&OrderGroup::categories_of(&user_id)).await?;
    let categories = fetch_categories(tx.conn(), &user_id).await?;

    let requested = new
        .category_id
        .as_ref()
        .filter(|id| categories.iter().any(|c| &c.id == *id));
    let category_id = match (requested, categories.first()) {
        (Some(id), _) => id.clone(),
        (None, Some(first)) => first.id.clone(),
        (None, None) => {
            let fallback = NewCategory {
                name: DEFAULT_CATEGORY_NAME.to_string(),
                color: DEFAULT_CATEGORY_COLOR.to_string(),
                order: None,
            };
            insert_category(tx, &user_id, fallback).await?.id
        }
    };

    // Uploads of the same file share its processed pages.
    let mirror: Option<(i64,)> = sqlx::query_as(
        "SELECT numpages FROM documents WHERE content_key = $1 \
         ORDER BY completed DESC, numpages DESC LIMIT 1",
    )
    .bind(new.content_key.as_str())
    .fetch_optional(tx.conn())
    .await
    .sql_context("Failed to look up uploaded content")?;
    let (numpages, completed) = match mirror {
        Some((numpages,)) => (numpages, true),
        None => (new.numpages, false),
    };

    let group = OrderGroup::documents_of(&category_id);
    let order = tx.reorder(&group, OrderAction::append()).await?;

    let mut document = Document {
        id: ID::generate(),
        category_id,
        name: new.name.unwrap_or_else(|| DEFAULT_DOCUMENT_NAME.to_string()),
        content_key: new.content_key,
        numpages,
        completed,
        order,
        bookmarks: Vec::new(),
    };
    sqlx::query(
        "INSERT INTO documents (id, category_id, name, content_key, numpages, completed, sort_order) \
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(document.id.as_str())
    .bind(document.category_id.as_str())
    .bind(document.name.as_str())
    .bind(document.content_key.as_str())
    .bind(document.numpages)
    .bind(i64::from(document.completed))
    .bind(document.order)
    .execute(tx.conn())
    .await
    .sql_context("Failed to insert document")?;

    let start = NewBookmark {
        page: 0,
        audiotime: 0,
        order: None,
    };
    document.bookmarks = vec![insert_bookmark(tx, &document.id, start).await?];

    tracing::debug!(
        document = %document.id,
        category = %document.category_id,
        order,
        deduplicated = completed,
        "Created document"
    );
    Ok(document)
}

async fn update_in(
    tx: &mut Transaction,
    user_id: ID,
    id: ID,
    patch: DocumentPatch,
) -> Result<Document> {
    let mut document = locked_document(tx, Some(&user_id), &id).await?;
    let from = OrderGroup::documents_of(&document.category_id);

    let target = patch
        .category_id
        .filter(|category_id| *category_id != document.category_id);
    match (target, patch.order) {
        (Some(category_id), order) => {
            fetch_category(tx.conn(), &user_id, &category_id).await?;

            tx.reorder(&from, OrderAction::delete_at(document.order))
                .await?;
            let to = OrderGroup::documents_of(&category_id);
            let position = tx.reorder(&to, OrderAction::insert(order)).await?;

            sqlx::query("UPDATE documents SET category_id = $1, sort_order = $2 WHERE id = $3")
                .bind(category_id.as_str())
                .bind(position)
                .bind(id.as_str())
                .execute(tx.conn())
                .await
                .sql_context("Failed to move document")?;

            tracing::debug!(document = %id, from = %document.category_id, to = %category_id, position, "Moved document between categories");
            document.category_id = category_id;
            document.order = position;
        }
        (None, Some(order)) => {
            let position = tx
                .reorder(&from, OrderAction::move_to(document.order, order))
                .await?;
            tx.write_at(&from, &id, position).await?;
            document.order = position;
        }
        (None, None) => {}
    }

    if let Some(name) = patch.name {
        sqlx::query("UPDATE documents SET name = $1 WHERE id = $2")
            .bind(name.as_str())
            .bind(id.as_str())
            .execute(tx.conn())
            .await
            .sql_context("Failed to rename document")?;
        document.name = name;
    }

    document.bookmarks = fetch_bookmarks(tx.conn(), &id).await?;
    Ok(document)
}

async fn delete_in(tx: &mut Transaction, owner: Option<ID>, id: ID) -> Result<()> {
    let document = locked_document(tx, owner.as_ref(), &id).await?;
    delete_locked(tx, &document).await
}

impl Library {
    /// Every document of `user_id` with its bookmarks, by category then
    /// position.
    pub async fn list_documents(&self, user_id: &ID) -> Result<Vec<Document>> {
        let mut conn = self.reader().await?;
        let sql = format!(
            "SELECT {COLUMNS} FROM documents d JOIN categories c ON c.id = d.category_id \
             WHERE c.user_id = $1 ORDER BY c.sort_order, d.sort_order"
        );
        let rows: Vec<DocumentRow> = sqlx::query_as(&sql)
            .bind(user_id.as_str())
            .fetch_all(&mut *conn)
            .await
            .sql_context("Failed to list documents")?;

        let mut bookmarks = fetch_bookmarks_of_user(&mut conn, user_id).await?;
        Ok(rows
            .into_iter()
            .map(from_row)
            .map(|mut document| {
                document.bookmarks = bookmarks.remove(&document.id).unwrap_or_default();
                document
            })
            .collect())
    }

    /// A document with its bookmarks.
    pub async fn get_document(&self, user_id: &ID, id: &ID) -> Result<Document> {
        let mut conn = self.reader().await?;
        let mut document = fetch_document(&mut conn, Some(user_id), id).await?;
        document.bookmarks = fetch_bookmarks(&mut conn, id).await?;
        Ok(document)
    }

    /// File a newly uploaded document.
    ///
    /// The document lands at the end of `new.category_id` if the user owns
    /// that category, else of the user's first category. A user without
    /// categories gets a "Recent Uploads" one. If the same content was
    /// uploaded before, its page count is reused and the document starts out
    /// completed. Every document starts with a bookmark on its first page.
    pub async fn create_document(&self, user_id: &ID, new: NewDocument) -> Result<Document> {
        new.check()?;
        let user_id = user_id.clone();
        let document = self
            .backend
            .transact(&self.options, move |tx| {
                Box::pin(create_in(tx, user_id.clone(), new.clone()))
            })
            .await?;
        tracing::info!(document = %document.id, "Created document");
        Ok(document)
    }

    /// Rename a document, move it within its category, or move it to another
    /// of the user's categories.
    ///
    /// When moving between categories, `patch.order` is the position in the
    /// new category; without it the document is appended.
    pub async fn update_document(
        &self,
        user_id: &ID,
        id: &ID,
        patch: DocumentPatch,
    ) -> Result<Document> {
        patch.check()?;
        let (user_id, id) = (user_id.clone(), id.clone());
        self.backend
            .transact(&self.options, move |tx| {
                Box::pin(update_in(tx, user_id.clone(), id.clone(), patch.clone()))
            })
            .await
    }

    /// Delete a document and its bookmarks.
    pub async fn delete_document(&self, user_id: &ID, id: &ID) -> Result<()> {
        let (owner, target) = (user_id.clone(), id.clone());
        self.backend
            .transact(&self.options, move |tx| {
                Box::pin(delete_in(tx, Some(owner.clone()), target.clone()))
            })
            .await?;
        tracing::info!(user = %user_id, document = %id, "Deleted document");
        Ok(())
    }

    /// Record that pages up to and including `page` have been processed.
    pub async fn record_page_processed(&self, document_id: &ID, page: i64) -> Result<()> {
        if page < 0 {
            return Err(LibraryError::invalid("page", "must be a non-negative integer").into());
        }
        let updated = sqlx::query("UPDATE documents SET numpages = $1 WHERE id = $2")
            .bind(page + 1)
            .bind(document_id.as_str())
            .execute(self.backend.pool())
            .await
            .sql_context("Failed to record processed page")?
            .rows_affected();
        if updated == 0 {
            return Err(LibraryError::DocumentNotFound {
                id: document_id.to_string(),
            }
            .into());
        }
        tracing::debug!(document = %document_id, page, "Processed page");
        Ok(())
    }

    /// Record that every page of a document has been processed.
    pub async fn mark_completed(&self, document_id: &ID) -> Result<()> {
        let updated = sqlx::query("UPDATE documents SET completed = 1 WHERE id = $1")
            .bind(document_id.as_str())
            .execute(self.backend.pool())
            .await
            .sql_context("Failed to mark document completed")?
            .rows_affected();
        if updated == 0 {
            return Err(LibraryError::DocumentNotFound {
                id: document_id.to_string(),
            }
            .into());
        }
        tracing::info!(document = %document_id, "Document completed");
        Ok(())
    }

    /// Remove a document whose upload failed to process.
    pub async fn discard_document(&self, document_id: &ID) -> Result<()> {
        let target = document_id.clone();
        self.backend
            .transact(&self.options, move |tx| {
                Box::pin(delete_in(tx, None, target.clone()))
            })
            .await?;
        tracing::warn!(document = %document_id, "Discarded document");
        Ok(())
    }
}
