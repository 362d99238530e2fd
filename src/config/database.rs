//! Database configuration module.
//!
//! Opens the pooled connection described by [`AppConfig`] and creates the storefront
//! tables from the entity definitions. `Schema::create_table_from_entity` keeps the
//! generated DDL in step with the Rust structs for both PostgreSQL and SQLite.

use crate::config::AppConfig;
use crate::entities::{Category, News, Product};
use crate::errors::{Error, Result};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityName, EntityTrait, Schema,
};
use tracing::{debug, info, instrument};

/// Establishes the store connection pool described by the configuration.
///
/// Connections are checked out per statement or transaction and returned to the
/// pool when the handle or transaction is dropped, on every exit path.
#[instrument(skip(config))]
pub async fn create_connection(config: &AppConfig) -> Result<DatabaseConnection> {
    if config.database_url.trim().is_empty() {
        return Err(Error::Config {
            message: "DATABASE_URL is not set and config file has no database_url".to_string(),
        });
    }
    let mut options = ConnectOptions::new(config.database_url.clone());
    options
        .max_connections(config.max_connections)
        .sqlx_logging(false);

    let db = Database::connect(options).await?;
    info!(backend = ?db.get_database_backend(), "Connected to backing store");
    Ok(db)
}

/// Creates the products, categories and news tables if they do not exist yet.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    create_table(db, Product).await?;
    create_table(db, Category).await?;
    create_table(db, News).await?;
    Ok(())
}

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> Result<()> {
    debug!("Ensuring table {}", entity.table_name());
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);
    let mut table = schema.create_table_from_entity(entity);
    table.if_not_exists();

    db.execute(builder.build(&table)).await?;
    Ok(())
}
