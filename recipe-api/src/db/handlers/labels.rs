//! Database repository for tags and ingredients.

use crate::{
    db::{
        errors::{DbError, Result},
        handlers::repository::Repository,
        models::labels::{LabelCreateDBRequest, LabelDBResponse, LabelKind, LabelUpdateDBRequest},
    },
    types::UserId,
};
use sqlx::SqliteConnection;
use tracing::instrument;

/// Filter for listing labels: always scoped to one owner
#[derive(Debug, Clone)]
pub struct LabelFilter {
    pub user_id: UserId,
}

impl LabelFilter {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }
}

pub struct Labels<'c> {
    db: &'c mut SqliteConnection,
    kind: LabelKind,
}

#[async_trait::async_trait]
impl<'c> Repository for Labels<'c> {
    type CreateRequest = LabelCreateDBRequest;
    type UpdateRequest = LabelUpdateDBRequest;
    type Response = LabelDBResponse;
    type Id = i64;
    type Filter = LabelFilter;

    #[instrument(skip(self, request), fields(kind = ?self.kind, user_id = request.user_id), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let label = sqlx::query_as::<_, LabelDBResponse>(&format!(
            "INSERT INTO {} (user_id, name) VALUES (?, ?) RETURNING id, user_id, name",
            self.kind.table()
        ))
        .bind(request.user_id)
        .bind(&request.name)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(label)
    }

    #[instrument(skip(self), fields(kind = ?self.kind), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let label = sqlx::query_as::<_, LabelDBResponse>(&format!(
            "SELECT id, user_id, name FROM {} WHERE id = ?",
            self.kind.table()
        ))
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(label)
    }

    /// Newest first
    #[instrument(skip(self, filter), fields(kind = ?self.kind, user_id = filter.user_id), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let labels = sqlx::query_as::<_, LabelDBResponse>(&format!(
            "SELECT id, user_id, name FROM {} WHERE user_id = ? ORDER BY id DESC",
            self.kind.table()
        ))
        .bind(filter.user_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(labels)
    }

    /// Link rows go with the label through `ON DELETE CASCADE`; recipes are untouched.
    #[instrument(skip(self), fields(kind = ?self.kind), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = ?", self.kind.table()))
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(kind = ?self.kind), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let label = sqlx::query_as::<_, LabelDBResponse>(&format!(
            "UPDATE {} SET name = ? WHERE id = ? RETURNING id, user_id, name",
            self.kind.table()
        ))
        .bind(&request.name)
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(label)
    }
}

impl<'c> Labels<'c> {
    pub fn new(db: &'c mut SqliteConnection, kind: LabelKind) -> Self {
        Self { db, kind }
    }

    /// Return the owner's label with this exact name, creating it if there is none.
    ///
    /// The insert is conditional on the row being absent and runs as one statement, so with the
    /// caller holding a write transaction two requests can never both insert. When duplicates
    /// already exist (plain `create` allows them) the lowest id wins.
    #[instrument(skip(self, name), fields(kind = ?self.kind), err)]
    pub async fn get_or_create(&mut self, user_id: UserId, name: &str) -> Result<(LabelDBResponse, bool)> {
        let table = self.kind.table();

        let inserted = sqlx::query(&format!(
            "INSERT INTO {table} (user_id, name) \
             SELECT ?, ? WHERE NOT EXISTS (SELECT 1 FROM {table} WHERE user_id = ? AND name = ?)"
        ))
        .bind(user_id)
        .bind(name)
        .bind(user_id)
        .bind(name)
        .execute(&mut *self.db)
        .await?;

        let label = sqlx::query_as::<_, LabelDBResponse>(&format!(
            "SELECT id, user_id, name FROM {table} WHERE user_id = ? AND name = ? ORDER BY id LIMIT 1"
        ))
        .bind(user_id)
        .bind(name)
        .fetch_one(&mut *self.db)
        .await?;

        Ok((label, inserted.rows_affected() == 1))
    }
}
