//! API request/response models.
//!
//! These types define the JSON contract of the HTTP API and carry the `ToSchema` derives used by
//! the OpenAPI document. Requests validate themselves before any storage work starts; responses
//! are projections of the database models in [`crate::db::models`].

use serde::{Deserialize, Deserializer};

use crate::errors::Error;

pub mod labels;
pub mod recipes;
pub mod users;

/// Longest title, label name or link accepted
pub const MAX_TEXT_LENGTH: usize = 255;

/// Reject blank or over-long required text fields.
pub(crate) fn validate_required_text(field: &str, value: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(Error::BadRequest {
            message: format!("{field} may not be blank"),
        });
    }
    validate_max_length(field, value)
}

pub(crate) fn validate_max_length(field: &str, value: &str) -> Result<(), Error> {
    if value.chars().count() > MAX_TEXT_LENGTH {
        return Err(Error::BadRequest {
            message: format!("{field} must be at most {MAX_TEXT_LENGTH} characters"),
        });
    }
    Ok(())
}

/// Deserialize an optional field whose omission means "unchanged". An explicit `null` is
/// rejected; pair with `#[serde(default)]`.
pub(crate) fn non_null<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}
