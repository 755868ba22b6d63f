//! Bookmarks, ordered per document.

use std::collections::HashMap;

use sqlx::AnyConnection;

use super::{
    Library,
    documents::fetch_document,
    errors::LibraryError,
    models::{Bookmark, BookmarkPatch, NewBookmark, check_audiotime, check_page},
};
use crate::{
    ID, Result, Transaction,
    backend::SqlxResultExt,
    order::{GroupRepository, OrderAction, OrderGroup},
};

type BookmarkRow = (String, String, i64, i64, i64);

fn from_row((id, document_id, page, audiotime, order): BookmarkRow) -> Bookmark {
    Bookmark {
        id: id.into(),
        document_id: document_id.into(),
        page,
        audiotime,
        order,
    }
}

async fn fetch_bookmark(conn: &mut AnyConnection, document_id: &ID, id: &ID) -> Result<Bookmark> {
    let row: Option<BookmarkRow> = sqlx::query_as(
        "SELECT id, document_id, page, audiotime, sort_order FROM bookmarks \
         WHERE id = $1 AND document_id = $2",
    )
    .bind(id.as_str())
    .bind(document_id.as_str())
    .fetch_optional(conn)
    .await
    .sql_context("Failed to read bookmark")?;

    row.map(from_row).ok_or_else(|| {
        LibraryError::BookmarkNotFound {
            id: id.to_string(),
            document_id: document_id.to_string(),
        }
        .into()
    })
}

/// The bookmarks of one document in order.
pub(super) async fn fetch_bookmarks(
    conn: &mut AnyConnection,
    document_id: &ID,
) -> Result<Vec<Bookmark>> {
    let rows: Vec<BookmarkRow> = sqlx::query_as(
        "SELECT id, document_id, page, audiotime, sort_order FROM bookmarks \
         WHERE document_id = $1 ORDER BY sort_order",
    )
    .bind(document_id.as_str())
    .fetch_all(conn)
    .await
    .sql_context("Failed to list bookmarks")?;
    Ok(rows.into_iter().map(from_row).collect())
}

/// The bookmarks of every document of `user_id`, keyed by document and in
/// order.
pub(super) async fn fetch_bookmarks_of_user(
    conn: &mut AnyConnection,
    user_id: &ID,
) -> Result<HashMap<ID, Vec<Bookmark>>> {
    let rows: Vec<BookmarkRow> = sqlx::query_as(
        "SELECT b.id, b.document_id, b.page, b.audiotime, b.sort_order FROM bookmarks b \
         JOIN documents d ON d.id = b.document_id \
         JOIN categories c ON c.id = d.category_id \
         WHERE c.user_id = $1 ORDER BY b.document_id, b.sort_order",
    )
    .bind(user_id.as_str())
    .fetch_all(conn)
    .await
    .sql_context("Failed to list bookmarks")?;

    let mut by_document: HashMap<ID, Vec<Bookmark>> = HashMap::new();
    for bookmark in rows.into_iter().map(from_row) {
        by_document
            .entry(bookmark.document_id.clone())
            .or_default()
            .push(bookmark);
    }
    Ok(by_document)
}

/// Insert `new` into the bookmarks of `document_id`.
pub(super) async fn insert_bookmark(
    tx: &mut Transaction,
    document_id: &ID,
    new: NewBookmark,
) -> Result<Bookmark> {
    let group = OrderGroup::bookmarks_of(document_id);
    let order = tx.reorder(&group, OrderAction::insert(new.order)).await?;

    let bookmark = Bookmark {
        id: ID::generate(),
        document_id: document_id.clone(),
        page: new.page,
        audiotime: new.audiotime,
        order,
    };
    sqlx::query(
        "INSERT INTO bookmarks (id, document_id, page, audiotime, sort_order) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(bookmark.id.as_str())
    .bind(bookmark.document_id.as_str())
    .bind(bookmark.page)
    .bind(bookmark.audiotime)
    .bind(bookmark.order)
    .execute(tx.conn())
    .await
    .sql_context("Failed to insert bookmark")?;

    Ok(bookmark)
}

async fn create_in(
    tx: &mut Transaction,
    user_id: ID,
    document_id: ID,
    new: NewBookmark,
) -> Result<Bookmark> {
    let document = fetch_document(tx.conn(), Some(&user_id), &document_id).await?;
    check_page(new.page, document.numpages)?;
    check_audiotime(new.audiotime)?;
    insert_bookmark(tx, &document_id, new).await
}

async fn update_in(
    tx: &mut Transaction,
    user_id: ID,
    document_id: ID,
    id: ID,
    patch: BookmarkPatch,
) -> Result<Bookmark> {
    let document = fetch_document(tx.conn(), Some(&user_id), &document_id).await?;
    let group = OrderGroup::bookmarks_of(&document_id);
    tx.lock_group(&group).await?;
    let mut bookmark = fetch_bookmark(tx.conn(), &document_id, &id).await?;

    if let Some(page) = patch.page {
        check_page(page, document.numpages)?;
        bookmark.page = page;
    }
    if let Some(audiotime) = patch.audiotime {
        check_audiotime(audiotime)?;
        bookmark.audiotime = audiotime;
    }
    if let Some(order) = patch.order {
        let position = tx
            .reorder(&group, OrderAction::move_to(bookmark.order, order))
            .await?;
        tx.write_at(&group, &id, position).await?;
        bookmark.order = position;
    }

    sqlx::query("UPDATE bookmarks SET page = $1, audiotime = $2 WHERE id = $3")
        .bind(bookmark.page)
        .bind(bookmark.audiotime)
        .bind(id.as_str())
        .execute(tx.conn())
        .await
        .sql_context("Failed to update bookmark")?;

    Ok(bookmark)
}

async fn delete_in(tx: &mut Transaction, user_id: ID, document_id: ID, id: ID) -> Result<()> {
    fetch_document(tx.conn(), Some(&user_id), &document_id).await?;
    let group = OrderGroup::bookmarks_of(&document_id);
    tx.lock_group(&group).await?;
    let bookmark = fetch_bookmark(tx.conn(), &document_id, &id).await?;

    tx.remove(&group, bookmark.order).await?;
    Ok(())
}

impl Library {
    /// Add a bookmark at `new.order`, or after the document's last one.
    pub async fn create_bookmark(
        &self,
        user_id: &ID,
        document_id: &ID,
        new: NewBookmark,
    ) -> Result<Bookmark> {
        let (user_id, document_id) = (user_id.clone(), document_id.clone());
        self.backend
            .transact(&self.options, move |tx| {
                Box::pin(create_in(
                    tx,
                    user_id.clone(),
                    document_id.clone(),
                    new.clone(),
                ))
            })
            .await
    }

    /// Change where a bookmark points, or move it.
    pub async fn update_bookmark(
        &self,
        user_id: &ID,
        document_id: &ID,
        id: &ID,
        patch: BookmarkPatch,
    ) -> Result<Bookmark> {
        let (user_id, document_id, id) = (user_id.clone(), document_id.clone(), id.clone());
        self.backend
            .transact(&self.options, move |tx| {
                Box::pin(update_in(
                    tx,
                    user_id.clone(),
                    document_id.clone(),
                    id.clone(),
                    patch.clone(),
                ))
            })
            .await
    }

    pub async fn delete_bookmark(&self, user_id: &ID, document_id: &ID, id: &ID) -> Result<()> {
        let (user_id, document_id, id) = (user_id.clone(), document_id.clone(), id.clone());
        self.backend
            .transact(&self.options, move |tx| {
                Box::pin(delete_in(
                    tx,
                    user_id.clone(),
                    document_id.clone(),
                    id.clone(),
                ))
            })
            .await
    }
}
