//! SQLite pool wrapper.
//!
//! SQLite allows one writer at a time. A deferred transaction that reads first and writes later
//! can fail with `SQLITE_BUSY` when another writer commits in between, so every request that
//! mutates state opens its transaction with `BEGIN IMMEDIATE` through [`DbPool::begin_write`].
//! Writers then queue on the busy timeout instead of failing, and each request still commits or
//! rolls back as a unit.
//!
//! ```ignore
//! let mut tx = state.db.begin_write().await?;
//! let recipe = Recipes::new(&mut tx).create(&request).await?;
//! tx.commit().await?;
//! ```

use sqlx::{
    Sqlite, SqlitePool, Transaction,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
};
use std::{ops::Deref, str::FromStr, time::Duration};

use crate::config::DatabaseConfig;

#[derive(Clone, Debug)]
pub struct DbPool {
    pool: SqlitePool,
}

impl DbPool {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if needed) the database described by `config`.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(config.busy_timeout);

        let settings = &config.pool;
        let pool = SqlitePoolOptions::new()
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
            .idle_timeout(non_zero_secs(settings.idle_timeout_secs))
            .max_lifetime(non_zero_secs(settings.max_lifetime_secs))
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Begin a transaction that takes the write lock up front.
    pub async fn begin_write(&self) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
        self.pool.begin_with("BEGIN IMMEDIATE").await
    }

    pub fn inner(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn non_zero_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

/// Plain reads (`acquire`, `fetch_*`) go straight to the pool.
impl Deref for DbPool {
    type Target = SqlitePool;

    fn deref(&self) -> &Self::Target {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PoolSettings;

    #[tokio::test]
    async fn test_write_transaction_rolls_back_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig {
            url: format!("sqlite://{}", dir.path().join("pool.db").display()),
            pool: PoolSettings::default(),
            busy_timeout: Duration::from_secs(5),
        };
        let db = DbPool::connect(&config).await.unwrap();
        sqlx::query("CREATE TABLE t (x INTEGER)").execute(db.inner()).await.unwrap();

        {
            let mut tx = db.begin_write().await.unwrap();
            sqlx::query("INSERT INTO t (x) VALUES (1)").execute(&mut *tx).await.unwrap();
            // dropped without commit
        }

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM t").fetch_one(&*db).await.unwrap();
        assert_eq!(count, 0);

        let mut tx = db.begin_write().await.unwrap();
        sqlx::query("INSERT INTO t (x) VALUES (2)").execute(&mut *tx).await.unwrap();
        tx.commit().await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM t").fetch_one(&*db).await.unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_non_zero_secs() {
        assert_eq!(non_zero_secs(0), None);
        assert_eq!(non_zero_secs(30), Some(Duration::from_secs(30)));
    }
}
