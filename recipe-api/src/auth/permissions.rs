//! Ownership policy.
//!
//! Recipes, tags and ingredients belong to exactly one user, and only that user may read, change
//! or delete them. No role bypasses this: staff and superuser flags do not grant access to other
//! users' records.
//!
//! Handlers load the record first (so an unknown id is a 404), then call [`authorize`] before
//! touching it.

use crate::api::models::users::CurrentUser;
use crate::errors::{Error, Result};
use crate::types::{Operation, Resource, UserId};
use tracing::debug;

/// Allow `action` on a record owned by `owner` only when the actor is that owner.
pub fn authorize(actor: &CurrentUser, owner: UserId, resource: Resource, action: Operation, id: i64) -> Result<()> {
    if actor.id == owner {
        return Ok(());
    }

    debug!(actor = actor.id, owner, %resource, %action, id, "ownership check failed");
    Err(Error::PermissionDenied { action, resource, id })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: UserId, is_superuser: bool) -> CurrentUser {
        CurrentUser {
            id,
            email: format!("user{id}@example.com"),
            name: String::new(),
            is_staff: is_superuser,
            is_superuser,
        }
    }

    #[test]
    fn test_owner_is_allowed() {
        assert!(authorize(&user(1, false), 1, Resource::Recipes, Operation::Update, 10).is_ok());
    }

    #[test]
    fn test_non_owner_is_denied() {
        let err = authorize(&user(2, false), 1, Resource::Tags, Operation::Delete, 5).unwrap_err();
        assert!(matches!(
            err,
            Error::PermissionDenied {
                action: Operation::Delete,
                resource: Resource::Tags,
                id: 5
            }
        ));
    }

    #[test]
    fn test_superuser_gets_no_bypass() {
        assert!(authorize(&user(3, true), 1, Resource::Ingredients, Operation::Read, 1).is_err());
    }
}
