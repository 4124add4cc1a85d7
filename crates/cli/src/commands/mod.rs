//! CLI subcommands.

pub mod migrate;
pub mod seed;
pub mod staff;

use sqlx::PgPool;
use thiserror::Error;

use printshop_storefront::config::{ConfigError, database_url_from_env};
use printshop_storefront::db::{self, RepositoryError};
use printshop_storefront::services::auth::AuthError;

/// Errors from any CLI command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Environment is missing the database URL.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Account could not be created.
    #[error("{0}")]
    Auth(#[from] AuthError),

    /// Repository operation failed.
    #[error("{0}")]
    Repository(#[from] RepositoryError),
}

/// Connect to the storefront database named by the environment.
pub(crate) async fn connect() -> Result<PgPool, CommandError> {
    let database_url = database_url_from_env()?;
    tracing::info!("Connecting to storefront database...");
    Ok(db::create_pool(&database_url).await?)
}
