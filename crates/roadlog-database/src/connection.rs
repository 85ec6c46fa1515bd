//! Database connection management

use roadlog_core::{DatabaseConfig, ServiceError, ServiceResult};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::sync::Arc;
use tracing::debug;

pub type DbConnection = DatabaseConnection;

/// Connect to the hosted Postgres that backs the analytics tables.
///
/// The schema is owned by the hosted backend, so no migrations run here.
pub async fn establish_connection(config: &DatabaseConfig) -> ServiceResult<Arc<DbConnection>> {
    if config.url.trim().is_empty() {
        return Err(ServiceError::Configuration {
            message: "database url is empty".to_string(),
        });
    }

    let mut opt = ConnectOptions::new(config.url.clone());
    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .sqlx_logging(false);

    debug!(
        max_connections = config.max_connections,
        "Connecting to analytics database"
    );

    let db = Database::connect(opt)
        .await
        .map_err(|e| ServiceError::Database(e.to_string()))?;

    Ok(Arc::new(db))
}
