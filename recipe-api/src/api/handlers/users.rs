use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState,
    api::{
        AppJson,
        models::{
            users::{CurrentUser, LoginRequest, ProfileUpdate, RegisterRequest, TokenResponse, UserResponse},
            validate_max_length,
        },
    },
    auth::{
        password::{hash_password_blocking, validate_password, verify_password_blocking},
        session,
        utils::normalize_email,
    },
    db::{
        errors::DbError,
        handlers::{Repository, Users},
        models::users::{UserCreateDBRequest, UserUpdateDBRequest},
    },
    errors::{Error, Result},
};

/// Register a new user account
#[utoipa::path(
    post,
    path = "/user/register",
    request_body = RegisterRequest,
    tag = "user",
    summary = "Register",
    responses(
        (status = 201, description = "User registered successfully", body = UserResponse),
        (status = 400, description = "Invalid email, short password, or email already registered"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    AppJson(request): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    if !state.config.auth.allow_registration {
        return Err(Error::BadRequest {
            message: "User registration is disabled".to_string(),
        });
    }

    let email = normalize_email(&request.email)?;
    validate_password(&request.password, &state.config.auth.password)?;
    validate_max_length("name", &request.name)?;

    // Hash before taking the write lock
    let password_hash = hash_password_blocking(request.password, state.config.auth.password.argon2_params()).await?;

    let mut tx = state.db.begin_write().await.map_err(DbError::from)?;
    let mut users = Users::new(&mut tx);

    if users.get_user_by_email(&email).await?.is_some() {
        return Err(Error::Conflict {
            message: "A user with this email already exists".to_string(),
        });
    }

    let user = users
        .create(&UserCreateDBRequest {
            email,
            name: request.name,
            password_hash,
            is_staff: false,
            is_superuser: false,
        })
        .await?;

    tx.commit().await.map_err(DbError::from)?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Exchange email and password for a session token
#[utoipa::path(
    post,
    path = "/user/login",
    request_body = LoginRequest,
    tag = "user",
    summary = "Log in",
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 400, description = "Unable to authenticate with provided credentials"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, AppJson(request): AppJson<LoginRequest>) -> Result<Json<TokenResponse>> {
    let email = request.email.trim();
    if email.is_empty() || request.password.is_empty() {
        return Err(Error::InvalidCredentials);
    }

    let user = {
        let mut conn = state.db.acquire().await.map_err(DbError::from)?;
        Users::new(&mut conn).get_user_by_email(email).await?
    };

    let user = user.filter(|u| u.is_active).ok_or(Error::InvalidCredentials)?;

    if !verify_password_blocking(request.password, user.password_hash).await? {
        return Err(Error::InvalidCredentials);
    }

    let token = session::create_session_token(user.id, &state.config)?;
    Ok(Json(TokenResponse { token }))
}

/// Get the signed-in user's profile
#[utoipa::path(
    get,
    path = "/user/me",
    tag = "user",
    summary = "Get profile",
    responses(
        (status = 200, description = "Profile", body = UserResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_me(current_user: CurrentUser) -> Result<Json<UserResponse>> {
    Ok(Json(UserResponse {
        email: current_user.email,
        name: current_user.name,
    }))
}

/// Update the signed-in user's name and/or password
#[utoipa::path(
    patch,
    path = "/user/me",
    request_body = ProfileUpdate,
    tag = "user",
    summary = "Update profile",
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_me(
    State(state): State<AppState>,
    current_user: CurrentUser,
    AppJson(update): AppJson<ProfileUpdate>,
) -> Result<Json<UserResponse>> {
    if let Some(name) = &update.name {
        validate_max_length("name", name)?;
    }

    let password_hash = match update.password {
        Some(password) => {
            validate_password(&password, &state.config.auth.password)?;
            Some(hash_password_blocking(password, state.config.auth.password.argon2_params()).await?)
        }
        None => None,
    };

    let mut tx = state.db.begin_write().await.map_err(DbError::from)?;
    let user = Users::new(&mut tx)
        .update(
            current_user.id,
            &UserUpdateDBRequest {
                name: update.name,
                password_hash,
                ..Default::default()
            },
        )
        .await?;
    tx.commit().await.map_err(DbError::from)?;

    Ok(Json(UserResponse::from(user)))
}

#[cfg(test)]
mod tests {
    use crate::{
        api::models::users::{TokenResponse, UserResponse},
        db::handlers::Users,
        test_utils::*,
    };
    use axum::http::StatusCode;
    use serde_json::json;

    #[test_log::test(tokio::test)]
    async fn test_register_normalizes_email_domain() {
        let (app, state) = create_test_app().await;

        let response = app
            .post("/user/register")
            .json(&json!({"email": "Test@Example.com", "password": "testpass123", "name": "Test"}))
            .await;

        response.assert_status(StatusCode::CREATED);
        let user: UserResponse = response.json();
        assert_eq!(user.email, "Test@example.com");
        assert_eq!(user.name, "Test");
        assert!(response.json::<serde_json::Value>().get("password").is_none());

        // Either casing resolves to the same stored record
        let mut conn = state.db.acquire().await.unwrap();
        let mut users = Users::new(&mut conn);
        let a = users.get_user_by_email("test@example.com").await.unwrap().unwrap();
        let b = users.get_user_by_email("Test@Example.com").await.unwrap().unwrap();
        assert_eq!(a.id, b.id);
    }

    #[test_log::test(tokio::test)]
    async fn test_register_rejects_invalid_input_without_creating_rows() {
        let (app, state) = create_test_app().await;

        for body in [
            json!({"email": "", "password": "testpass123", "name": "Test"}),
            json!({"email": "not-an-email", "password": "testpass123", "name": "Test"}),
            json!({"email": "short@example.com", "password": "pw", "name": "Test"}),
            json!({"email": "short@example.com"}),
        ] {
            let response = app.post("/user/register").json(&body).await;
            response.assert_status(StatusCode::BAD_REQUEST);
            assert!(response.json::<serde_json::Value>()["message"].is_string());
        }

        assert_eq!(count_rows(&state.db, "users").await, 0);
    }

    #[test_log::test(tokio::test)]
    async fn test_register_duplicate_email() {
        let (app, state) = create_test_app().await;
        let body = json!({"email": "cook@example.com", "password": "testpass123", "name": "Cook"});

        app.post("/user/register").json(&body).await.assert_status(StatusCode::CREATED);

        let response = app
            .post("/user/register")
            .json(&json!({"email": "cook@EXAMPLE.com", "password": "testpass123", "name": "Again"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json::<serde_json::Value>()["message"],
            "A user with this email already exists"
        );
        assert_eq!(count_rows(&state.db, "users").await, 1);
    }

    #[test_log::test(tokio::test)]
    async fn test_register_disabled() {
        let mut config = create_test_config();
        config.auth.allow_registration = false;
        let (app, _state) = create_test_app_with_config(config).await;

        app.post("/user/register")
            .json(&json!({"email": "cook@example.com", "password": "testpass123"}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[test_log::test(tokio::test)]
    async fn test_login_issues_token() {
        let (app, _state) = create_test_app().await;
        register_user(&app, "cook@example.com", "testpass123").await;

        let response = app
            .post("/user/login")
            .json(&json!({"email": "cook@example.com", "password": "testpass123"}))
            .await;

        response.assert_status_ok();
        let token: TokenResponse = response.json();

        let me = app.get("/user/me").add_header("authorization", bearer(&token.token)).await;
        me.assert_status_ok();
        assert_eq!(me.json::<UserResponse>().email, "cook@example.com");
    }

    #[test_log::test(tokio::test)]
    async fn test_login_failures_are_400() {
        let (app, _state) = create_test_app().await;
        register_user(&app, "cook@example.com", "testpass123").await;

        for body in [
            json!({"email": "cook@example.com", "password": "wrongpass"}),
            json!({"email": "cook@example.com", "password": ""}),
            json!({"email": "nobody@example.com", "password": "testpass123"}),
        ] {
            let response = app.post("/user/login").json(&body).await;
            response.assert_status(StatusCode::BAD_REQUEST);
            assert_eq!(
                response.json::<serde_json::Value>()["message"],
                "Unable to authenticate with provided credentials"
            );
        }
    }

    #[test_log::test(tokio::test)]
    async fn test_profile_requires_authentication() {
        let (app, _state) = create_test_app().await;

        app.get("/user/me").await.assert_status(StatusCode::UNAUTHORIZED);
        app.get("/user/me")
            .add_header("authorization", "Bearer garbage")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[test_log::test(tokio::test)]
    async fn test_post_to_profile_not_allowed() {
        let (app, _state) = create_test_app().await;
        let token = register_and_login(&app, "cook@example.com").await;

        app.post("/user/me")
            .add_header("authorization", bearer(&token))
            .json(&json!({}))
            .await
            .assert_status(StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test_log::test(tokio::test)]
    async fn test_update_profile() {
        let (app, _state) = create_test_app().await;
        let token = register_and_login(&app, "cook@example.com").await;

        let response = app
            .patch("/user/me")
            .add_header("authorization", bearer(&token))
            .json(&json!({"name": "New Name", "password": "newpassword123"}))
            .await;
        response.assert_status_ok();
        let user: UserResponse = response.json();
        assert_eq!(user.name, "New Name");
        assert_eq!(user.email, "cook@example.com");

        // The new password works and the old one no longer does
        app.post("/user/login")
            .json(&json!({"email": "cook@example.com", "password": "newpassword123"}))
            .await
            .assert_status_ok();
        app.post("/user/login")
            .json(&json!({"email": "cook@example.com", "password": DEFAULT_TEST_PASSWORD}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[test_log::test(tokio::test)]
    async fn test_update_profile_name_only_keeps_password() {
        let (app, _state) = create_test_app().await;
        let token = register_and_login(&app, "cook@example.com").await;

        app.patch("/user/me")
            .add_header("authorization", bearer(&token))
            .json(&json!({"name": "Renamed"}))
            .await
            .assert_status_ok();

        app.post("/user/login")
            .json(&json!({"email": "cook@example.com", "password": DEFAULT_TEST_PASSWORD}))
            .await
            .assert_status_ok();
    }

    #[test_log::test(tokio::test)]
    async fn test_update_profile_short_password_rejected() {
        let (app, _state) = create_test_app().await;
        let token = register_and_login(&app, "cook@example.com").await;

        app.patch("/user/me")
            .add_header("authorization", bearer(&token))
            .json(&json!({"password": "123"}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[test_log::test(tokio::test)]
    async fn test_update_profile_null_name_rejected() {
        let (app, _state) = create_test_app().await;
        let token = register_and_login(&app, "cook@example.com").await;

        app.patch("/user/me")
            .add_header("authorization", bearer(&token))
            .json(&json!({"name": null}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
