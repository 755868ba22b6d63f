//! SQL implementation of [`GroupRepository`].
//!
//! Table and column names come from [`GroupKind`](crate::order::GroupKind),
//! never from callers, so formatting them into statements is safe. Values
//! are always bound.

use async_trait::async_trait;

use super::Transaction;
use crate::{
    ID, Result,
    backend::{BackendError, DbKind, SqlxResultExt},
    order::{GroupRepository, OrderGroup, OrderRange},
};

#[async_trait]
impl GroupRepository for Transaction {
    async fn lock_group(&mut self, group: &OrderGroup) -> Result<()> {
        let parent = group.kind().parent_table();
        let sql = match self.kind {
            DbKind::Postgres => format!("SELECT id FROM {parent} WHERE id = $1 FOR UPDATE"),
            // SQLite has no row locks; the transaction already holds the
            // database write lock. The no-op write still checks the parent.
            DbKind::Sqlite => format!("UPDATE {parent} SET id = id WHERE id = $1"),
        };

        let locked = sqlx::query(&sql)
            .bind(group.id().as_str())
            .execute(self.conn())
            .await
            .sql_context(&format!("Failed to lock group {group}"))?
            .rows_affected();

        if locked == 0 {
            return Err(BackendError::RowNotFound {
                table: parent,
                id: group.id().to_string(),
            }
            .into());
        }
        tracing::trace!(group = %group, "Locked group");
        Ok(())
    }

    async fn max_order(&mut self, group: &OrderGroup) -> Result<Option<i64>> {
        let kind = group.kind();
        let sql = format!(
            "SELECT MAX(sort_order) FROM {} WHERE {} = $1",
            kind.table(),
            kind.group_column()
        );

        sqlx::query_scalar::<_, Option<i64>>(&sql)
            .bind(group.id().as_str())
            .fetch_one(self.conn())
            .await
            .sql_context(&format!("Failed to read bounds of {group}"))
    }

    async fn shift_range(
        &mut self,
        group: &OrderGroup,
        range: OrderRange,
        delta: i64,
    ) -> Result<u64> {
        let kind = group.kind();
        let mut sql = format!(
            "UPDATE {} SET sort_order = sort_order + $1 WHERE {} = $2 AND sort_order >= $3",
            kind.table(),
            kind.group_column()
        );
        if range.end.is_some() {
            sql.push_str(" AND sort_order < $4");
        }

        let mut query = sqlx::query(&sql)
            .bind(delta)
            .bind(group.id().as_str())
            .bind(range.start);
        if let Some(end) = range.end {
            query = query.bind(end);
        }

        let rows = query
            .execute(self.conn())
            .await
            .sql_context(&format!("Failed to shift {group}"))?
            .rows_affected();
        Ok(rows)
    }

    async fn write_at(&mut self, group: &OrderGroup, item: &ID, position: i64) -> Result<()> {
        let kind = group.kind();
        let sql = format!(
            "UPDATE {} SET sort_order = $1 WHERE id = $2 AND {} = $3",
            kind.table(),
            kind.group_column()
        );

        let written = sqlx::query(&sql)
            .bind(position)
            .bind(item.as_str())
            .bind(group.id().as_str())
            .execute(self.conn())
            .await
            .sql_context(&format!("Failed to write order of {item} in {group}"))?
            .rows_affected();

        if written == 0 {
            return Err(BackendError::RowNotFound {
                table: kind.table(),
                id: item.to_string(),
            }
            .into());
        }
        Ok(())
    }

    async fn delete_at(&mut self, group: &OrderGroup, position: i64) -> Result<u64> {
        let kind = group.kind();
        let sql = format!(
            "DELETE FROM {} WHERE {} = $1 AND sort_order = $2",
            kind.table(),
            kind.group_column()
        );

        let rows = sqlx::query(&sql)
            .bind(group.id().as_str())
            .bind(position)
            .execute(self.conn())
            .await
            .sql_context(&format!("Failed to delete position {position} of {group}"))?
            .rows_affected();
        Ok(rows)
    }
}
