//! Database connection management

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::sync::Arc;
use temps_core::{DatabaseConfig, ServiceError, ServiceResult};
use temps_migrations::{Migrator, MigratorTrait};
use tracing::{debug, info};

pub type DbConnection = DatabaseConnection;

pub async fn establish_connection(database_url: &str) -> ServiceResult<Arc<DbConnection>> {
    establish_connection_with_config(&DatabaseConfig::new(database_url)).await
}

pub async fn establish_connection_with_config(
    config: &DatabaseConfig,
) -> ServiceResult<Arc<DbConnection>> {
    let (min_connections, max_connections) = config.normalize();

    let mut opt = ConnectOptions::new(config.url.clone());
    opt.max_connections(max_connections)
        .min_connections(min_connections)
        .sqlx_logging(false);

    debug!(
        "Connecting to database (pool {}..{})",
        min_connections, max_connections
    );

    let db = Database::connect(opt)
        .await
        .map_err(|e| ServiceError::Database(e.to_string()))?;

    // Run migrations
    Migrator::up(&db, None)
        .await
        .map_err(|e| ServiceError::Database(e.to_string()))?;

    info!("Database connection established and migrations applied");

    Ok(Arc::new(db))
}
