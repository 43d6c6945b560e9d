//! Test utilities for database integration tests
//!
//! By default every [`TestDatabase`] is a private, migrated in-memory SQLite
//! database, so tests are isolated and need no external services. Set
//! `TEMPS_TEST_DATABASE_URL` to run the same tests against PostgreSQL; tests
//! sharing that database are serialized and start from empty tables.

use crate::DbConnection;
use sea_orm::*;
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;
use std::time::Duration;
use temps_migrations::Migrator;
use tokio::sync::{Mutex, OnceCell, OwnedMutexGuard};

/// Environment variable naming an external database for tests
pub const TEST_DATABASE_URL_ENV: &str = "TEMPS_TEST_DATABASE_URL";

/// Tables owned by the goal engine schema, children first
const TABLES: [&str; 5] = [
    "conversions",
    "goals",
    "events",
    "request_sessions",
    "visitor",
];

/// Serializes tests that share an external database
static EXTERNAL_DB_LOCK: OnceCell<Arc<Mutex<()>>> = OnceCell::const_new();

pub struct TestDatabase {
    pub db: Arc<DbConnection>,
    pub database_url: String,
    #[allow(dead_code)]
    external_guard: Option<OwnedMutexGuard<()>>,
}

impl TestDatabase {
    /// Connect without running migrations
    pub async fn new() -> anyhow::Result<Self> {
        match std::env::var(TEST_DATABASE_URL_ENV) {
            Ok(url) => Self::external(url).await,
            Err(_) => Self::in_memory().await,
        }
    }

    /// Connect and bring the schema up to date with empty tables
    pub async fn with_migrations() -> anyhow::Result<Self> {
        let test_db = Self::new().await?;

        test_db
            .test_connection()
            .await
            .map_err(|e| anyhow::anyhow!("Database connection test failed: {}", e))?;

        Migrator::up(test_db.db.as_ref(), None)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;

        if test_db.external_guard.is_some() {
            test_db.cleanup_all_tables().await?;
        }

        Ok(test_db)
    }

    async fn in_memory() -> anyhow::Result<Self> {
        let database_url = "sqlite::memory:".to_string();

        // Each pooled connection would see its own in-memory database, so the
        // pool is pinned to one connection that never expires.
        let mut opt = ConnectOptions::new(database_url.clone());
        opt.max_connections(1)
            .min_connections(1)
            .idle_timeout(Duration::from_secs(3600))
            .max_lifetime(Duration::from_secs(3600))
            .sqlx_logging(false);

        let db = Database::connect(opt)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to open in-memory database: {}", e))?;

        Ok(Self {
            db: Arc::new(db),
            database_url,
            external_guard: None,
        })
    }

    async fn external(database_url: String) -> anyhow::Result<Self> {
        let lock = EXTERNAL_DB_LOCK
            .get_or_init(|| async { Arc::new(Mutex::new(())) })
            .await
            .clone();
        let guard = lock.lock_owned().await;

        let db = Self::connect_with_retry(&database_url, 10).await?;

        Ok(Self {
            db: Arc::new(db),
            database_url,
            external_guard: Some(guard),
        })
    }

    /// Connect to database with retry logic
    async fn connect_with_retry(
        database_url: &str,
        max_retries: u32,
    ) -> anyhow::Result<DbConnection> {
        let mut retries = max_retries;

        let mut opt = ConnectOptions::new(database_url.to_owned());
        opt.max_connections(5)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        loop {
            match Database::connect(opt.clone()).await {
                Ok(db) => return Ok(db),
                Err(e) if retries > 0 => {
                    eprintln!(
                        "Failed to connect to database (retries left: {}): {}",
                        retries, e
                    );
                    retries -= 1;
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
                Err(e) => {
                    return Err(anyhow::anyhow!(
                        "Failed to connect to database after {} retries: {}",
                        max_retries,
                        e
                    ));
                }
            }
        }
    }

    fn backend(&self) -> DatabaseBackend {
        self.db.get_database_backend()
    }

    /// Execute raw SQL for testing
    pub async fn execute_sql(&self, sql: &str) -> anyhow::Result<ExecResult> {
        let statement = Statement::from_string(self.backend(), sql.to_owned());
        Ok(self.db.execute(statement).await?)
    }

    /// Query raw SQL and return results
    pub async fn query_sql(&self, sql: &str) -> anyhow::Result<Vec<QueryResult>> {
        let statement = Statement::from_string(self.backend(), sql.to_owned());
        Ok(self.db.query_all(statement).await?)
    }

    /// Delete all rows from the goal engine tables, keeping the schema
    pub async fn cleanup_all_tables(&self) -> anyhow::Result<()> {
        for table in TABLES {
            let sql = match self.backend() {
                DatabaseBackend::Postgres => {
                    format!("TRUNCATE TABLE {} RESTART IDENTITY CASCADE", table)
                }
                _ => format!("DELETE FROM {}", table),
            };
            self.execute_sql(&sql).await?;
        }
        Ok(())
    }

    /// Test database connectivity
    pub async fn test_connection(&self) -> anyhow::Result<()> {
        let result = self.query_sql("SELECT 1").await?;

        if result.is_empty() {
            return Err(anyhow::anyhow!("Connection test failed"));
        }

        Ok(())
    }

    /// Get the database connection
    pub fn connection(&self) -> &DbConnection {
        &self.db
    }

    /// Get the database connection as Arc
    pub fn connection_arc(&self) -> Arc<DbConnection> {
        Arc::clone(&self.db)
    }
}
