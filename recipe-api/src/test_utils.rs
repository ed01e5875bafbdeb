//! Test utilities shared by unit and HTTP tests.

use std::{path::Path, str::FromStr, time::Duration};

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::json;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

use crate::{
    AppState, Application,
    api::models::users::TokenResponse,
    auth::password::{Argon2Params, hash_password},
    config::{Config, PasswordConfig},
    db::{
        DbPool,
        handlers::{Repository, Users},
        models::users::UserCreateDBRequest,
    },
    types::UserId,
};

pub const DEFAULT_TEST_PASSWORD: &str = "testpass123";

/// In-memory database with migrations applied.
///
/// Every `sqlite::memory:` connection is its own database, so the pool is pinned to a single
/// connection that is never recycled.
pub async fn create_test_pool() -> DbPool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("Invalid in-memory SQLite URL")
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .expect("Failed to open in-memory database");

    crate::migrator().run(&pool).await.expect("Failed to run migrations");
    DbPool::new(pool)
}

/// File-backed WAL database for tests that need several real connections.
pub async fn create_file_test_pool(path: &Path, max_connections: u32) -> DbPool {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .expect("Failed to open file database");

    crate::migrator().run(&pool).await.expect("Failed to run migrations");
    DbPool::new(pool)
}

pub fn create_test_config() -> Config {
    let mut config = Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        secret_key: Some("test-secret-key-for-testing-only".to_string()),
        ..Default::default()
    };
    // Cheap hashing keeps HTTP tests fast
    config.auth.password = PasswordConfig {
        argon2_memory_kib: 1024,
        argon2_iterations: 1,
        ..Default::default()
    };
    config
}

pub async fn create_test_state() -> AppState {
    AppState::builder().db(create_test_pool().await).config(create_test_config()).build()
}

pub async fn create_test_app() -> (TestServer, AppState) {
    create_test_app_with_config(create_test_config()).await
}

pub async fn create_test_app_with_config(config: Config) -> (TestServer, AppState) {
    let pool = create_test_pool().await;
    let state = AppState::builder().db(pool.clone()).config(config.clone()).build();

    let app = Application::new_with_pool(config, pool)
        .await
        .expect("Failed to create application");

    (app.into_test_server(), state)
}

/// Insert an active user directly, bypassing registration. The password is [`DEFAULT_TEST_PASSWORD`].
pub async fn insert_test_user(pool: &DbPool, email: &str) -> UserId {
    let password_hash = hash_password(
        DEFAULT_TEST_PASSWORD,
        Argon2Params {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        },
    )
    .expect("Failed to hash test password");

    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    Users::new(&mut conn)
        .create(&UserCreateDBRequest {
            email: email.to_string(),
            name: "Test User".to_string(),
            password_hash,
            is_staff: false,
            is_superuser: false,
        })
        .await
        .expect("Failed to create test user")
        .id
}

pub async fn count_rows(pool: &DbPool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool.inner())
        .await
        .expect("Failed to count rows")
}

pub async fn register_user(app: &TestServer, email: &str, password: &str) {
    app.post("/user/register")
        .json(&json!({"email": email, "password": password, "name": "Test User"}))
        .await
        .assert_status(StatusCode::CREATED);
}

/// Register with [`DEFAULT_TEST_PASSWORD`] and return a session token.
pub async fn register_and_login(app: &TestServer, email: &str) -> String {
    register_user(app, email, DEFAULT_TEST_PASSWORD).await;

    let response = app
        .post("/user/login")
        .json(&json!({"email": email, "password": DEFAULT_TEST_PASSWORD}))
        .await;
    response.assert_status_ok();
    response.json::<TokenResponse>().token
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
