//! Request extractor resolving the `Authorization` header to the calling user.

use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::{session, utils::parse_authorization},
    db::{
        errors::DbError,
        handlers::{Repository, Users},
    },
    errors::{Error, Result},
};
use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::{debug, instrument, trace};

fn unauthenticated(message: &str) -> Error {
    Error::Unauthenticated {
        message: Some(message.to_string()),
    }
}

/// Extract the raw token from the request headers.
/// Returns:
/// - None: No Authorization header present
/// - Some(Ok(token)): A Bearer/Token credential was found
/// - Some(Err(error)): Header present but unusable
fn try_token_from_headers(parts: &Parts) -> Option<Result<&str>> {
    let header = parts.headers.get(axum::http::header::AUTHORIZATION)?;

    let value = match header.to_str() {
        Ok(v) => v,
        Err(_) => return Some(Err(unauthenticated("Invalid authorization header"))),
    };

    Some(parse_authorization(value).ok_or_else(|| unauthenticated("Unsupported authorization scheme")))
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    /// Verify the token, then load the user so deactivation takes effect immediately. The pool
    /// connection is released before the handler runs.
    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let token = match try_token_from_headers(parts) {
            Some(token) => token?,
            None => {
                trace!("No credentials on request");
                return Err(Error::Unauthenticated { message: None });
            }
        };

        let user_id = session::verify_session_token(token, &state.config)?;

        let mut conn = state.db.acquire().await.map_err(DbError::from)?;
        let user = Users::new(&mut conn)
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| unauthenticated("User no longer exists"))?;

        if !user.is_active {
            return Err(unauthenticated("User account is disabled"));
        }

        debug!("Authenticated user {}", user.id);
        Ok(CurrentUser::from(user))
    }
}
