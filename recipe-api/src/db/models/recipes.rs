//! Database models for recipes.

use crate::db::models::labels::LabelDBResponse;
use crate::types::{RecipeId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Database request for creating a recipe.
///
/// `tags` and `ingredients` are label names; each is resolved with get-or-create against the
/// owner's labels and attached to the new recipe.
#[derive(Debug, Clone)]
pub struct RecipeCreateDBRequest {
    pub user_id: UserId,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: String,
    pub description: String,
    pub tags: Vec<String>,
    pub ingredients: Vec<String>,
}

/// Partial update. Scalar `None`s keep the stored value; label names are attached in addition to
/// the existing associations.
#[derive(Debug, Clone, Default)]
pub struct RecipeUpdateDBRequest {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Decimal>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub ingredients: Option<Vec<String>>,
}

/// A recipe with its associations resolved, ordered by label id.
#[derive(Debug, Clone)]
pub struct RecipeDBResponse {
    pub id: RecipeId,
    pub user_id: UserId,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub tags: Vec<LabelDBResponse>,
    pub ingredients: Vec<LabelDBResponse>,
}
