//! Repository implementations for database access.
//!
//! Each repository wraps a borrowed `SqliteConnection` (normally a write transaction from
//! [`crate::db::DbPool::begin_write`]) and implements the [`Repository`] trait.
//!
//! - [`Users`]: accounts, lookup by email
//! - [`Labels`]: tags and ingredients, including the atomic get-or-create
//! - [`Recipes`]: recipes and their tag/ingredient associations
//!
//! ```ignore
//! let mut tx = state.db.begin_write().await?;
//! let tag = Labels::new(&mut tx, LabelKind::Tag).get_or_create(user.id, "vegan").await?;
//! tx.commit().await?;
//! ```

pub mod labels;
pub mod recipes;
pub mod repository;
pub mod users;

pub use labels::Labels;
pub use recipes::Recipes;
pub use repository::Repository;
pub use users::Users;
