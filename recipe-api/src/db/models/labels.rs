//! Database models for tags and ingredients.
//!
//! Both are user-owned named labels with identical storage, differing only in the table they live
//! in and the link table that attaches them to recipes.

use crate::types::{Resource, UserId};

/// Which label table a [`crate::db::handlers::Labels`] repository operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    Tag,
    Ingredient,
}

impl LabelKind {
    pub fn table(self) -> &'static str {
        match self {
            LabelKind::Tag => "tags",
            LabelKind::Ingredient => "ingredients",
        }
    }

    /// Link table joining recipes to this kind of label
    pub fn link_table(self) -> &'static str {
        match self {
            LabelKind::Tag => "recipe_tags",
            LabelKind::Ingredient => "recipe_ingredients",
        }
    }

    /// Column in [`Self::link_table`] referencing the label
    pub fn link_column(self) -> &'static str {
        match self {
            LabelKind::Tag => "tag_id",
            LabelKind::Ingredient => "ingredient_id",
        }
    }

    pub fn resource(self) -> Resource {
        match self {
            LabelKind::Tag => Resource::Tags,
            LabelKind::Ingredient => Resource::Ingredients,
        }
    }

    /// Human readable name for error messages
    pub fn display_name(self) -> &'static str {
        match self {
            LabelKind::Tag => "Tag",
            LabelKind::Ingredient => "Ingredient",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LabelCreateDBRequest {
    pub user_id: UserId,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct LabelUpdateDBRequest {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct LabelDBResponse {
    pub id: i64,
    pub user_id: UserId,
    pub name: String,
}
