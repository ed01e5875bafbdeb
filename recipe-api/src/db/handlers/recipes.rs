//! Database repository for recipes and their tag/ingredient associations.

use crate::{
    db::{
        errors::{DbError, Result},
        handlers::{labels::Labels, repository::Repository},
        models::{
            labels::{LabelDBResponse, LabelKind},
            recipes::{RecipeCreateDBRequest, RecipeDBResponse, RecipeUpdateDBRequest},
        },
    },
    types::{RecipeId, UserId},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, SqliteConnection};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::instrument;

const RECIPE_COLUMNS: &str = "id, user_id, title, time_minutes, price, link, description, created_at, updated_at";

/// Filter for listing recipes: always scoped to one owner
#[derive(Debug, Clone)]
pub struct RecipeFilter {
    pub user_id: UserId,
}

impl RecipeFilter {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }
}

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct Recipe {
    id: RecipeId,
    user_id: UserId,
    title: String,
    time_minutes: i32,
    price: String,
    link: String,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct LinkedLabel {
    recipe_id: RecipeId,
    id: i64,
    user_id: UserId,
    name: String,
}

impl Recipe {
    fn into_response(self, tags: Vec<LabelDBResponse>, ingredients: Vec<LabelDBResponse>) -> Result<RecipeDBResponse> {
        let price = Decimal::from_str(&self.price)
            .map_err(|e| DbError::Other(anyhow::anyhow!("recipe {} has unreadable price {:?}: {e}", self.id, self.price)))?;

        Ok(RecipeDBResponse {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            time_minutes: self.time_minutes,
            price,
            link: self.link,
            description: self.description,
            created_at: self.created_at,
            updated_at: self.updated_at,
            tags,
            ingredients,
        })
    }
}

pub struct Recipes<'c> {
    db: &'c mut SqliteConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Recipes<'c> {
    type CreateRequest = RecipeCreateDBRequest;
    type UpdateRequest = RecipeUpdateDBRequest;
    type Response = RecipeDBResponse;
    type Id = RecipeId;
    type Filter = RecipeFilter;

    #[instrument(skip(self, request), fields(user_id = request.user_id, tags = request.tags.len(), ingredients = request.ingredients.len()), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let now = Utc::now();
        let recipe = sqlx::query_as::<_, Recipe>(&format!(
            "INSERT INTO recipes (user_id, title, time_minutes, price, link, description, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING {RECIPE_COLUMNS}"
        ))
        .bind(request.user_id)
        .bind(&request.title)
        .bind(request.time_minutes)
        .bind(request.price.to_string())
        .bind(&request.link)
        .bind(&request.description)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *self.db)
        .await?;

        self.attach_labels(recipe.id, recipe.user_id, LabelKind::Tag, &request.tags).await?;
        self.attach_labels(recipe.id, recipe.user_id, LabelKind::Ingredient, &request.ingredients)
            .await?;

        let tags = self.labels_for_recipe(recipe.id, LabelKind::Tag).await?;
        let ingredients = self.labels_for_recipe(recipe.id, LabelKind::Ingredient).await?;
        recipe.into_response(tags, ingredients)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let recipe = sqlx::query_as::<_, Recipe>(&format!("SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = ?"))
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        let Some(recipe) = recipe else {
            return Ok(None);
        };

        let tags = self.labels_for_recipe(recipe.id, LabelKind::Tag).await?;
        let ingredients = self.labels_for_recipe(recipe.id, LabelKind::Ingredient).await?;
        recipe.into_response(tags, ingredients).map(Some)
    }

    /// Newest first, with associations loaded in one query per label kind
    #[instrument(skip(self, filter), fields(user_id = filter.user_id), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let recipes = sqlx::query_as::<_, Recipe>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes WHERE user_id = ? ORDER BY id DESC"
        ))
        .bind(filter.user_id)
        .fetch_all(&mut *self.db)
        .await?;

        let mut tags = self.labels_for_owner(filter.user_id, LabelKind::Tag).await?;
        let mut ingredients = self.labels_for_owner(filter.user_id, LabelKind::Ingredient).await?;

        recipes
            .into_iter()
            .map(|recipe| {
                let recipe_tags = tags.remove(&recipe.id).unwrap_or_default();
                let recipe_ingredients = ingredients.remove(&recipe.id).unwrap_or_default();
                recipe.into_response(recipe_tags, recipe_ingredients)
            })
            .collect()
    }

    /// Link rows cascade; the tags and ingredients themselves are kept.
    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = ?")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let owner: UserId = sqlx::query_scalar(
            "UPDATE recipes SET \
                title = COALESCE(?, title), \
                time_minutes = COALESCE(?, time_minutes), \
                price = COALESCE(?, price), \
                link = COALESCE(?, link), \
                description = COALESCE(?, description), \
                updated_at = ? \
             WHERE id = ? RETURNING user_id",
        )
        .bind(&request.title)
        .bind(request.time_minutes)
        .bind(request.price.map(|p| p.to_string()))
        .bind(&request.link)
        .bind(&request.description)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        if let Some(tags) = &request.tags {
            self.attach_labels(id, owner, LabelKind::Tag, tags).await?;
        }
        if let Some(ingredients) = &request.ingredients {
            self.attach_labels(id, owner, LabelKind::Ingredient, ingredients).await?;
        }

        self.get_by_id(id).await?.ok_or(DbError::NotFound)
    }
}

impl<'c> Recipes<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    /// Resolve each name to the owner's label (creating it if needed) and link it to the recipe.
    /// Names already linked, or repeated in `names`, are linked once.
    #[instrument(skip(self, names), fields(count = names.len()), err)]
    pub async fn attach_labels(&mut self, recipe_id: RecipeId, user_id: UserId, kind: LabelKind, names: &[String]) -> Result<()> {
        for name in names {
            let (label, _) = Labels::new(&mut *self.db, kind).get_or_create(user_id, name).await?;

            sqlx::query(&format!(
                "INSERT OR IGNORE INTO {} (recipe_id, {}) VALUES (?, ?)",
                kind.link_table(),
                kind.link_column()
            ))
            .bind(recipe_id)
            .bind(label.id)
            .execute(&mut *self.db)
            .await?;
        }

        Ok(())
    }

    /// Remove one association. Returns false if the label was not attached.
    #[instrument(skip(self), err)]
    pub async fn detach_label(&mut self, recipe_id: RecipeId, kind: LabelKind, label_id: i64) -> Result<bool> {
        let result = sqlx::query(&format!(
            "DELETE FROM {} WHERE recipe_id = ? AND {} = ?",
            kind.link_table(),
            kind.link_column()
        ))
        .bind(recipe_id)
        .bind(label_id)
        .execute(&mut *self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn labels_for_recipe(&mut self, recipe_id: RecipeId, kind: LabelKind) -> Result<Vec<LabelDBResponse>> {
        let labels = sqlx::query_as::<_, LabelDBResponse>(&format!(
            "SELECT l.id, l.user_id, l.name FROM {link} AS rl \
             JOIN {table} AS l ON l.id = rl.{column} \
             WHERE rl.recipe_id = ? ORDER BY l.id",
            link = kind.link_table(),
            table = kind.table(),
            column = kind.link_column(),
        ))
        .bind(recipe_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(labels)
    }

    async fn labels_for_owner(&mut self, user_id: UserId, kind: LabelKind) -> Result<HashMap<RecipeId, Vec<LabelDBResponse>>> {
        let rows = sqlx::query_as::<_, LinkedLabel>(&format!(
            "SELECT rl.recipe_id, l.id, l.user_id, l.name FROM {link} AS rl \
             JOIN {table} AS l ON l.id = rl.{column} \
             JOIN recipes AS r ON r.id = rl.recipe_id \
             WHERE r.user_id = ? ORDER BY l.id",
            link = kind.link_table(),
            table = kind.table(),
            column = kind.link_column(),
        ))
        .bind(user_id)
        .fetch_all(&mut *self.db)
        .await?;

        let mut by_recipe: HashMap<RecipeId, Vec<LabelDBResponse>> = HashMap::new();
        for row in rows {
            by_recipe.entry(row.recipe_id).or_default().push(LabelDBResponse {
                id: row.id,
                user_id: row.user_id,
                name: row.name,
            });
        }

        Ok(by_recipe)
    }
}
