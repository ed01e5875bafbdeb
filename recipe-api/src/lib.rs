//! # recipe-api: Recipe Management Backend
//!
//! `recipe-api` is a multi-tenant REST service for storing recipes. Each signed-up user owns a
//! private collection of recipes and of the tags and ingredients used to label them. Users
//! register with an email address and password, exchange those credentials for a session token,
//! and send the token on every other request.
//!
//! ## Architecture
//!
//! The crate is an [Axum](https://github.com/tokio-rs/axum) application over SQLite:
//!
//! - **API layer** ([`api`]): HTTP handlers and request/response models. Each handler
//!   authenticates through the [`api::models::users::CurrentUser`] extractor, validates its body
//!   and runs its work through repositories.
//! - **Authentication** ([`auth`]): Argon2 password hashing, JWT session tokens and the single
//!   ownership policy used by every resource.
//! - **Database layer** ([`db`]): repositories implementing [`db::handlers::Repository`] over a
//!   borrowed SQLite connection, and the [`db::DbPool`] wrapper that opens write transactions.
//!
//! ### Request flow
//!
//! 1. `CurrentUser` reads `Authorization: Bearer <token>`, verifies the token and loads the user
//! 2. The handler validates the JSON body
//! 3. A `BEGIN IMMEDIATE` transaction is opened for writes; repositories do the work on it
//! 4. Ownership is checked with [`auth::permissions::authorize`] before any update or delete
//! 5. The transaction commits and the response is projected into a list or detail view
//!
//! Tags and ingredients named in a recipe body are resolved per owner with an atomic
//! get-or-create, so concurrent requests naming the same label end up sharing one row.
//!
//! ## Getting started
//!
//! ```no_run
//! use recipe_api::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = recipe_api::config::Args { config: "config.yaml".into(), validate: false };
//!     let config = Config::load(&args)?;
//!     recipe_api::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async { tokio::signal::ctrl_c().await.ok(); }).await
//! }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod openapi;
pub mod telemetry;
pub mod types;

#[cfg(test)]
pub mod test_utils;

use crate::{
    auth::{password::hash_password_blocking, utils::normalize_email},
    config::CorsOrigin,
    db::{
        DbPool,
        handlers::{Repository, Users},
        models::users::{UserCreateDBRequest, UserUpdateDBRequest},
    },
    openapi::ApiDoc,
};
use axum::{
    Json, Router,
    http::{self, HeaderValue},
    routing::{delete, get, post},
};
use bon::Builder;
pub use config::Config;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::{IngredientId, RecipeId, TagId, UserId};

/// Application state shared across all request handlers.
///
/// # Fields
///
/// - `db`: SQLite pool; writes go through [`DbPool::begin_write`]
/// - `config`: application configuration (secret key, password rules, token expiry)
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
}

/// Get the database migrator.
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create the initial superuser if it doesn't exist, or reset its password and flags if it does.
///
/// Runs on every start-up when `admin_email` is configured, so it must be idempotent.
///
/// # Errors
///
/// Returns an error if the email is malformed, hashing fails, or a database operation fails.
#[instrument(skip_all)]
pub async fn create_initial_superuser(email: &str, password: &str, db: &DbPool, config: &Config) -> errors::Result<UserId> {
    let email = normalize_email(email)?;
    let password_hash = hash_password_blocking(password.to_string(), config.auth.password.argon2_params()).await?;

    let mut tx = db.begin_write().await.map_err(db::errors::DbError::from)?;
    let mut users = Users::new(&mut tx);

    let user_id = match users.get_user_by_email(&email).await? {
        Some(existing) => {
            users
                .update(
                    existing.id,
                    &UserUpdateDBRequest {
                        password_hash: Some(password_hash),
                        is_active: Some(true),
                        is_staff: Some(true),
                        is_superuser: Some(true),
                        ..Default::default()
                    },
                )
                .await?;
            existing.id
        }
        None => {
            users
                .create(&UserCreateDBRequest {
                    email,
                    name: String::new(),
                    password_hash,
                    is_staff: true,
                    is_superuser: true,
                })
                .await?
                .id
        }
    };

    tx.commit().await.map_err(db::errors::DbError::from)?;
    Ok(user_id)
}

fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors_config = &config.auth.security.cors;

    // `AllowOrigin::list` rejects `*`, so a wildcard entry switches to `Any`
    let allow_origin = if cors_config.allowed_origins.iter().any(|o| matches!(o, CorsOrigin::Wildcard)) {
        AllowOrigin::any()
    } else {
        let mut origins = Vec::new();
        for origin in &cors_config.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                // Url keeps a trailing slash; browsers send the origin without one
                origins.push(url.as_str().trim_end_matches('/').parse::<HeaderValue>()?);
            }
        }
        AllowOrigin::list(origins)
    };

    let mut cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([http::Method::GET, http::Method::POST, http::Method::PATCH, http::Method::DELETE])
        .allow_headers([http::header::AUTHORIZATION, http::header::CONTENT_TYPE])
        .allow_credentials(cors_config.allow_credentials);

    if let Some(max_age) = cors_config.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the application router with all endpoints and middleware.
///
/// Methods not registered for a path (for example `POST /user/me`) get axum's 405 response.
///
/// # Errors
///
/// Returns an error if the CORS configuration is invalid.
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    use api::handlers::{ingredients, recipes, tags, users};

    let cors_layer = create_cors_layer(&state.config)?;

    let api_routes = Router::new()
        // Accounts
        .route("/user/register", post(users::register))
        .route("/user/login", post(users::login))
        .route("/user/me", get(users::get_me).patch(users::update_me))
        // Recipes
        .route("/recipes", get(recipes::list_recipes).post(recipes::create_recipe))
        .route(
            "/recipes/{id}",
            get(recipes::get_recipe).patch(recipes::update_recipe).delete(recipes::delete_recipe),
        )
        .route("/recipes/{id}/tags/{tag_id}", delete(recipes::detach_tag))
        .route("/recipes/{id}/ingredients/{ingredient_id}", delete(recipes::detach_ingredient))
        // Tags
        .route("/tags", get(tags::list_tags).post(tags::create_tag))
        .route("/tags/{id}", get(tags::get_tag).patch(tags::update_tag).delete(tags::delete_tag))
        // Ingredients
        .route("/ingredients", get(ingredients::list_ingredients).post(ingredients::create_ingredient))
        .route(
            "/ingredients/{id}",
            get(ingredients::get_ingredient)
                .patch(ingredients::update_ingredient)
                .delete(ingredients::delete_ingredient),
        )
        .with_state(state);

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .merge(api_routes)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .layer(cors_layer)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    Ok(router)
}

/// Main application struct that owns the router and the database pool.
///
/// # Lifecycle
///
/// 1. **Create**: [`Application::new`] opens the database, runs migrations and creates the
///    configured superuser
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and starts handling requests
/// 3. **Shutdown**: when the shutdown future resolves, in-flight requests drain, the pool closes
///    and buffered spans are flushed
pub struct Application {
    router: Router,
    config: Config,
    pool: DbPool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting recipe-api with configuration: {:#?}", config);

        let pool = DbPool::connect(&config.database).await?;
        info!("Running database migrations...");
        migrator().run(pool.inner()).await?;

        Self::new_with_pool(config, pool).await
    }

    /// Create an application over an already-migrated pool
    pub async fn new_with_pool(config: Config, pool: DbPool) -> anyhow::Result<Self> {
        if let (Some(email), Some(password)) = (config.admin_email.as_deref(), config.admin_password.as_deref()) {
            let user_id = create_initial_superuser(email, password, &pool, &config).await?;
            info!(user_id, "Initial superuser ready");
        }

        let app_state = AppState::builder().db(pool.clone()).config(config.clone()).build();
        let router = build_router(app_state)?;

        Ok(Self { router, config, pool })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("recipe-api listening on http://{}", bind_addr);

        axum::serve(listener, self.router).with_graceful_shutdown(shutdown).await?;

        info!("Closing database connections...");
        self.pool.close().await;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}
