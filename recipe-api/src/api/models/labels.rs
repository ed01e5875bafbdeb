//! API request/response models for tags and ingredients.

use super::validate_required_text;
use crate::db::models::labels::LabelDBResponse;
use crate::errors::Error;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body for creating or renaming a tag or ingredient
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LabelCreate {
    #[schema(example = "Vegan")]
    pub name: String,
}

pub type LabelUpdate = LabelCreate;

impl LabelCreate {
    pub fn validate(&self) -> Result<(), Error> {
        validate_required_text("name", &self.name)
    }
}

/// Name-only reference used inside recipe payloads; resolved with get-or-create.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LabelDescriptor {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LabelResponse {
    pub id: i64,
    pub name: String,
}

impl From<LabelDBResponse> for LabelResponse {
    fn from(db: LabelDBResponse) -> Self {
        Self { id: db.id, name: db.name }
    }
}

/// Validate descriptors and pull out their names, keeping request order.
pub(crate) fn descriptor_names(field: &str, descriptors: &[LabelDescriptor]) -> Result<Vec<String>, Error> {
    descriptors
        .iter()
        .map(|d| {
            validate_required_text(&format!("{field} name"), &d.name)?;
            Ok(d.name.clone())
        })
        .collect()
}
