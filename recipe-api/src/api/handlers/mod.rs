//! HTTP request handlers for all API endpoints.
//!
//! Handlers follow one shape. Reads borrow a pooled connection; anything that writes opens a
//! single `BEGIN IMMEDIATE` transaction, does all its work through repositories on that
//! transaction and commits once, so a failing request leaves nothing behind. Request bodies are
//! validated before the transaction starts.
//!
//! - [`users`]: registration, login, profile
//! - [`recipes`]: recipe CRUD and association detach
//! - [`tags`] and [`ingredients`]: label CRUD, both delegating to [`labels`]

pub mod ingredients;
pub mod labels;
pub mod recipes;
pub mod tags;
pub mod users;
