//! Database layer for data persistence and access.
//!
//! Storage is SQLite through SQLx, organised with the repository pattern:
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  (api::handlers - HTTP request handlers)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │ Repositories│  (db::handlers - queries)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │   Models    │  (db::models - database records)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │   SQLite    │
//! └─────────────┘
//! ```
//!
//! - [`handlers`]: repository implementations
//! - [`models`]: request and response records
//! - [`errors`]: database-specific error types
//! - [`pools`]: the pool wrapper and write-transaction entry point

pub mod errors;
pub mod handlers;
pub mod models;
pub mod pools;

pub use pools::DbPool;
