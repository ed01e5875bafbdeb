//! API request/response models for recipes.
//!
//! Recipes have two views: the list view returned by `GET /recipes`, and the detail view
//! (list view plus `description`) returned everywhere else.

use super::labels::{LabelDescriptor, LabelResponse, descriptor_names};
use super::{non_null, validate_max_length, validate_required_text};
use crate::db::models::recipes::{RecipeCreateDBRequest, RecipeDBResponse, RecipeUpdateDBRequest};
use crate::errors::Error;
use crate::types::{RecipeId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Most decimal places accepted in a price
const PRICE_SCALE: u32 = 2;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RecipeCreate {
    #[schema(example = "Chocolate cake")]
    pub title: String,
    #[schema(minimum = 0, example = 30)]
    pub time_minutes: i32,
    /// Accepted as a JSON number or a decimal string
    #[schema(value_type = String, example = "5.00")]
    pub price: Decimal,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<LabelDescriptor>,
    #[serde(default)]
    pub ingredients: Vec<LabelDescriptor>,
}

/// Partial update: omitted fields keep their value and an explicit `null` is rejected. Tags and
/// ingredients given here are added to the recipe; nothing is detached.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RecipeUpdate {
    #[serde(default, deserialize_with = "non_null")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "non_null")]
    #[schema(minimum = 0)]
    pub time_minutes: Option<i32>,
    #[serde(default, deserialize_with = "non_null")]
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    #[serde(default, deserialize_with = "non_null")]
    pub link: Option<String>,
    #[serde(default, deserialize_with = "non_null")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "non_null")]
    pub tags: Option<Vec<LabelDescriptor>>,
    #[serde(default, deserialize_with = "non_null")]
    pub ingredients: Option<Vec<LabelDescriptor>>,
}

fn validate_time(time_minutes: i32) -> Result<(), Error> {
    if time_minutes < 0 {
        return Err(Error::BadRequest {
            message: "time_minutes must not be negative".to_string(),
        });
    }
    Ok(())
}

fn validate_price(price: &Decimal) -> Result<(), Error> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(Error::BadRequest {
            message: "price must not be negative".to_string(),
        });
    }
    if price.normalize().scale() > PRICE_SCALE {
        return Err(Error::BadRequest {
            message: format!("price must have at most {PRICE_SCALE} decimal places"),
        });
    }
    Ok(())
}

impl RecipeCreate {
    /// Validate and convert into a storage request for `owner`.
    pub fn into_db_request(self, owner: UserId) -> Result<RecipeCreateDBRequest, Error> {
        validate_required_text("title", &self.title)?;
        validate_time(self.time_minutes)?;
        validate_price(&self.price)?;
        validate_max_length("link", &self.link)?;

        Ok(RecipeCreateDBRequest {
            user_id: owner,
            tags: descriptor_names("tag", &self.tags)?,
            ingredients: descriptor_names("ingredient", &self.ingredients)?,
            title: self.title,
            time_minutes: self.time_minutes,
            price: self.price,
            link: self.link,
            description: self.description,
        })
    }
}

impl RecipeUpdate {
    pub fn into_db_request(self) -> Result<RecipeUpdateDBRequest, Error> {
        if let Some(title) = &self.title {
            validate_required_text("title", title)?;
        }
        if let Some(time_minutes) = self.time_minutes {
            validate_time(time_minutes)?;
        }
        if let Some(price) = &self.price {
            validate_price(price)?;
        }
        if let Some(link) = &self.link {
            validate_max_length("link", link)?;
        }

        Ok(RecipeUpdateDBRequest {
            tags: self.tags.as_deref().map(|t| descriptor_names("tag", t)).transpose()?,
            ingredients: self
                .ingredients
                .as_deref()
                .map(|i| descriptor_names("ingredient", i))
                .transpose()?,
            title: self.title,
            time_minutes: self.time_minutes,
            price: self.price,
            link: self.link,
            description: self.description,
        })
    }
}

/// List view of a recipe
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecipeResponse {
    pub id: RecipeId,
    pub title: String,
    pub time_minutes: i32,
    #[schema(value_type = String, example = "5.00")]
    pub price: Decimal,
    pub link: String,
    pub tags: Vec<LabelResponse>,
    pub ingredients: Vec<LabelResponse>,
}

/// Detail view of a recipe
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecipeDetailResponse {
    #[serde(flatten)]
    pub recipe: RecipeResponse,
    pub description: String,
}

impl From<RecipeDBResponse> for RecipeResponse {
    fn from(db: RecipeDBResponse) -> Self {
        Self {
            id: db.id,
            title: db.title,
            time_minutes: db.time_minutes,
            price: db.price,
            link: db.link,
            tags: db.tags.into_iter().map(LabelResponse::from).collect(),
            ingredients: db.ingredients.into_iter().map(LabelResponse::from).collect(),
        }
    }
}

impl From<RecipeDBResponse> for RecipeDetailResponse {
    fn from(mut db: RecipeDBResponse) -> Self {
        let description = std::mem::take(&mut db.description);
        Self {
            recipe: RecipeResponse::from(db),
            description,
        }
    }
}
