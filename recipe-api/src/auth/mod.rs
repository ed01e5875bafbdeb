//! Authentication and authorization.
//!
//! Clients log in with email and password at `/user/login` and receive a signed session token
//! (JWT). Every other protected endpoint expects it as `Authorization: Bearer <token>`
//! (`Token <token>` is accepted too). The [`current_user::CurrentUser`] extractor turns the
//! header into an explicit user value handed to each handler; there is no ambient session state.
//!
//! Authorization is ownership: [`permissions::authorize`] is the single check applied before a
//! recipe, tag or ingredient is read, changed or deleted.
//!
//! - [`current_user`]: the `CurrentUser` extractor
//! - [`password`]: Argon2 hashing and password rules
//! - [`permissions`]: the ownership policy
//! - [`session`]: token issue and verification
//! - [`utils`]: email normalization and header parsing

pub mod current_user;
pub mod password;
pub mod permissions;
pub mod session;
pub mod utils;
