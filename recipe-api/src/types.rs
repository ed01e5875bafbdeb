//! Common type definitions and permission system types.
//!
//! This module defines:
//! - Type aliases for entity IDs (UserId, RecipeId, etc.)
//! - Resource and operation enums used by the ownership policy
//!
//! # ID Types
//!
//! All entity IDs are SQLite integer row ids. They increase monotonically, so
//! ordering by descending id lists the most recently created records first.
//!
//! - [`UserId`]: User account identifier
//! - [`RecipeId`]: Recipe identifier
//! - [`TagId`]: Tag identifier
//! - [`IngredientId`]: Ingredient identifier

use std::fmt;

// Type aliases for IDs
pub type UserId = i64;
pub type RecipeId = i64;
pub type TagId = i64;
pub type IngredientId = i64;

// Operations that can be performed on owned resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Read,
    Update,
    Delete,
}

// Resources that can be operated on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Recipes,
    Tags,
    Ingredients,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Read => write!(f, "read"),
            Operation::Update => write!(f, "update"),
            Operation::Delete => write!(f, "delete"),
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Recipes => write!(f, "recipe"),
            Resource::Tags => write!(f, "tag"),
            Resource::Ingredients => write!(f, "ingredient"),
        }
    }
}
