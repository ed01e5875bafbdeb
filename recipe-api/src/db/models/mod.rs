//! Database request and response models.
//!
//! These are what repositories accept and return. They are kept separate from the API models in
//! [`crate::api::models`] so the storage layout can change without touching the HTTP contract;
//! the API layer converts with `From` impls.
//!
//! - [`users`]: accounts and their flags
//! - [`labels`]: tags and ingredients, which share one shape
//! - [`recipes`]: recipes together with their resolved associations

pub mod labels;
pub mod recipes;
pub mod users;
