//! Users, the owners of category groups.

use sqlx::AnyConnection;

use super::{
    Library,
    errors::LibraryError,
    models::{User, check_name},
};
use crate::{ID, Result, backend::SqlxResultExt};

type UserRow = (String, String, String);

fn from_row((id, name, email): UserRow) -> User {
    User {
        id: id.into(),
        name,
        email,
    }
}

/// Read a user, reporting a missing one as [`LibraryError::UserNotFound`].
pub(super) async fn fetch_user(conn: &mut AnyConnection, id: &ID) -> Result<User> {
    let row: Option<UserRow> = sqlx::query_as("SELECT id, name, email FROM users WHERE id = $1")
        .bind(id.as_str())
        .fetch_optional(conn)
        .await
        .sql_context("Failed to read user")?;

    row.map(from_row).ok_or_else(|| {
        LibraryError::UserNotFound {
            id: id.to_string(),
        }
        .into()
    })
}

impl Library {
    /// Register a user.
    pub async fn create_user(&self, name: &str, email: &str) -> Result<User> {
        check_name("name", name)?;
        if !email.contains('@') {
            return Err(LibraryError::invalid("email", "must be an email address").into());
        }

        let user = User {
            id: ID::generate(),
            name: name.trim().to_string(),
            email: email.trim().to_string(),
        };
        sqlx::query("INSERT INTO users (id, name, email) VALUES ($1, $2, $3)")
            .bind(user.id.as_str())
            .bind(user.name.as_str())
            .bind(user.email.as_str())
            .execute(self.backend.pool())
            .await
            .sql_context("Failed to insert user")?;

        tracing::info!(user = %user.id, "Created user");
        Ok(user)
    }

    pub async fn get_user(&self, id: &ID) -> Result<User> {
        let mut conn = self.reader().await?;
        fetch_user(&mut conn, id).await
    }

    /// Every user, by name.
    pub async fn list_users(&self) -> Result<Vec<User>> {
        let rows: Vec<UserRow> = sqlx::query_as("SELECT id, name, email FROM users ORDER BY name, id")
            .fetch_all(self.backend.pool())
            .await
            .sql_context("Failed to list users")?;
        Ok(rows.into_iter().map(from_row).collect())
    }
}
