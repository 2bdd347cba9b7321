//! Command implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use sqlx::SqlitePool;
use thiserror::Error;

use huerto_storefront::config::{ConfigError, StorefrontConfig};
use huerto_storefront::db::{self, RepositoryError};
use huerto_storefront::services::auth::AuthError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Repository operation failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Account operation failed.
    #[error("Account error: {0}")]
    Auth(#[from] AuthError),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Account already exists.
    #[error("An account already exists with email: {0}")]
    UserExists(String),
}

/// Load the storefront configuration and open its database.
///
/// Uses `STOREFRONT_DATABASE_URL` (or `DATABASE_URL`), loading `.env` first.
async fn connect() -> Result<SqlitePool, CommandError> {
    let config = StorefrontConfig::from_env()?;

    tracing::info!("Connecting to storefront database...");
    Ok(db::create_pool(&config.database_url).await?)
}
