//! Categories, ordered per user.

use sqlx::AnyConnection;

use super::{
    Library,
    errors::LibraryError,
    models::{Category, CategoryPatch, NewCategory},
    users::fetch_user,
};
use crate::{
    ID, Result, Transaction,
    backend::SqlxResultExt,
    order::{GroupRepository, OrderAction, OrderGroup},
};

type CategoryRow = (String, String, String, String, i64);

const COLUMNS: &str = "id, user_id, name, color, sort_order";

fn from_row((id, user_id, name, color, order): CategoryRow) -> Category {
    Category {
        id: id.into(),
        user_id: user_id.into(),
        name,
        color,
        order,
    }
}

/// Read a category owned by `user_id`.
pub(super) async fn fetch_category(
    conn: &mut AnyConnection,
    user_id: &ID,
    id: &ID,
) -> Result<Category> {
    let sql = format!("SELECT {COLUMNS} FROM categories WHERE id = $1 AND user_id = $2");
    let row: Option<CategoryRow> = sqlx::query_as(&sql)
        .bind(id.as_str())
        .bind(user_id.as_str())
        .fetch_optional(conn)
        .await
        .sql_context("Failed to read category")?;

    row.map(from_row).ok_or_else(|| {
        LibraryError::CategoryNotFound {
            id: id.to_string(),
        }
        .into()
    })
}

/// The categories of `user_id` in order.
pub(super) async fn fetch_categories(
    conn: &mut AnyConnection,
    user_id: &ID,
) -> Result<Vec<Category>> {
    let sql = format!("SELECT {COLUMNS} FROM categories WHERE user_id = $1 ORDER BY sort_order");
    let rows: Vec<CategoryRow> = sqlx::query_as(&sql)
        .bind(user_id.as_str())
        .fetch_all(conn)
        .await
        .sql_context("Failed to list categories")?;
    Ok(rows.into_iter().map(from_row).collect())
}

/// Insert `new` into the categories of `user_id`.
///
/// The user must have been checked to exist.
pub(super) async fn insert_category(
    tx: &mut Transaction,
    user_id: &ID,
    new: NewCategory,
) -> Result<Category> {
    let group = OrderGroup::categories_of(user_id);
    let order = tx.reorder(&group, OrderAction::insert(new.order)).await?;

    let category = Category {
        id: ID::generate(),
        user_id: user_id.clone(),
        name: new.name,
        color: new.color,
        order,
    };
    sqlx::query(
        "INSERT INTO categories (id, user_id, name, color, sort_order) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(category.id.as_str())
    .bind(category.user_id.as_str())
    .bind(category.name.as_str())
    .bind(category.color.as_str())
    .bind(category.order)
    .execute(tx.conn())
    .await
    .sql_context("Failed to insert category")?;

    tracing::debug!(user = %user_id, category = %category.id, order, "Created category");
    Ok(category)
}

async fn create_in(tx: &mut Transaction, user_id: ID, new: NewCategory) -> Result<Category> {
    fetch_user(tx.conn(), &user_id).await?;
    insert_category(tx, &user_id, new).await
}

async fn update_in(
    tx: &mut Transaction,
    user_id: ID,
    id: ID,
    patch: CategoryPatch,
) -> Result<Category> {
    let group = OrderGroup::categories_of(&user_id);
    tx.lock_group(&group).await?;
    let mut category = fetch_category(tx.conn(), &user_id, &id).await?;

    if let Some(order) = patch.order {
        let position = tx
            .reorder(&group, OrderAction::move_to(category.order, order))
            .await?;
        tx.write_at(&group, &id, position).await?;
        category.order = position;
    }
    if let Some(name) = patch.name {
        category.name = name;
    }
    if let Some(color) = patch.color {
        category.color = color;
    }

    sqlx::query("UPDATE categories SET name = $1, color = $2 WHERE id = $3")
        .bind(category.name.as_str())
        .bind(category.color.as_str())
        .bind(id.as_str())
        .execute(tx.conn())
        .await
        .sql_context("Failed to update category")?;

    Ok(category)
}

async fn delete_in(tx: &mut Transaction, user_id: ID, id: ID) -> Result<()> {
    let group = OrderGroup::categories_of(&user_id);
    tx.lock_group(&group).await?;
    let category = fetch_category(tx.conn(), &user_id, &id).await?;

    // The whole document group goes, so its order needs no upkeep beyond
    // keeping concurrent uploads and bookmark writers out.
    tx.lock_group(&OrderGroup::documents_of(&id)).await?;
    let members: Vec<(String,)> =
        sqlx::query_as("SELECT id FROM documents WHERE category_id = $1")
            .bind(id.as_str())
            .fetch_all(tx.conn())
            .await
            .sql_context("Failed to list documents of category")?;
    for (document_id,) in &members {
        tx.lock_group(&OrderGroup::bookmarks_of(document_id.as_str()))
            .await?;
    }
    let bookmarks = sqlx::query(
        "DELETE FROM bookmarks WHERE document_id IN (SELECT id FROM documents WHERE category_id = $1)",
    )
    .bind(id.as_str())
    .execute(tx.conn())
    .await
    .sql_context("Failed to delete bookmarks of category")?
    .rows_affected();
    let documents = sqlx::query("DELETE FROM documents WHERE category_id = $1")
        .bind(id.as_str())
        .execute(tx.conn())
        .await
        .sql_context("Failed to delete documents of category")?
        .rows_affected();

    tx.reorder(&group, OrderAction::delete_at(category.order))
        .await?;
    sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id.as_str())
        .execute(tx.conn())
        .await
        .sql_context("Failed to delete category")?;

    tracing::debug!(category = %id, documents, bookmarks, "Deleted category");
    Ok(())
}

impl Library {
    /// The categories of `user_id` in order.
    pub async fn list_categories(&self, user_id: &ID) -> Result<Vec<Category>> {
        let mut conn = self.reader().await?;
        fetch_categories(&mut conn, user_id).await
    }

    pub async fn get_category(&self, user_id: &ID, id: &ID) -> Result<Category> {
        let mut conn = self.reader().await?;
        fetch_category(&mut conn, user_id, id).await
    }

    /// Create a category at `new.order`, or at the end of the user's
    /// categories.
    pub async fn create_category(&self, user_id: &ID, new: NewCategory) -> Result<Category> {
        new.check()?;
        let user_id = user_id.clone();
        self.backend
            .transact(&self.options, move |tx| {
                Box::pin(create_in(tx, user_id.clone(), new.clone()))
            })
            .await
    }

    /// Rename, recolour or move a category.
    pub async fn update_category(
        &self,
        user_id: &ID,
        id: &ID,
        patch: CategoryPatch,
    ) -> Result<Category> {
        patch.check()?;
        let (user_id, id) = (user_id.clone(), id.clone());
        self.backend
            .transact(&self.options, move |tx| {
                Box::pin(update_in(tx, user_id.clone(), id.clone(), patch.clone()))
            })
            .await
    }

    /// Delete a category with its documents and their bookmarks.
    pub async fn delete_category(&self, user_id: &ID, id: &ID) -> Result<()> {
        let (owner, target) = (user_id.clone(), id.clone());
        self.backend
            .transact(&self.options, move |tx| {
                Box::pin(delete_in(tx, owner.clone(), target.clone()))
            })
            .await?;
        tracing::info!(user = %user_id, category = %id, "Deleted category");
        Ok(())
    }
}
