//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! - **Users** (`/user/*`): registration, login and the caller's own profile
//! - **Recipes** (`/recipes/*`): recipes and their tag/ingredient associations
//! - **Tags** (`/tags/*`) and **Ingredients** (`/ingredients/*`): the caller's labels
//!
//! Every endpoint except registration and login requires a session token, and every resource
//! endpoint only ever sees the caller's own records.
//!
//! # OpenAPI Documentation
//!
//! All endpoints are documented with `utoipa` annotations. The document is served at
//! `/openapi.json` and rendered at `/docs`.

use axum::extract::FromRequest;

use crate::errors::Error;

pub mod handlers;
pub mod models;

/// `axum::Json` with body rejections reported through [`Error`], so malformed or mistyped bodies
/// get the same `{"message": ...}` 400 response as every other validation failure.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct AppJson<T>(pub T);
