//! Database operations for the storefront `SQLite` store.
//!
//! # Tables
//!
//! - `products` - Catalog entries, ids assigned by `SQLite`
//! - `users` - Accounts (email + argon2 hash, admin flag)
//! - `cart_items` - `(user_id, product_id, quantity)` lines
//! - `tower_sessions` - Session storage, created by the session store
//!
//! Relations between the tables are by convention: there are no foreign keys,
//! and a cart line may outlive the product it points at.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and embedded in the
//! binary. They run on startup (unless disabled) or via:
//! ```bash
//! cargo run -p huerto-cli -- migrate
//! ```

pub mod cart;
pub mod products;
pub mod users;

use std::str::FromStr;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use thiserror::Error;

pub use cart::CartRepository;
pub use products::ProductRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation.
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `SQLite` connection pool.
///
/// The database file is created if it does not exist. In-memory URLs
/// (`sqlite::memory:`) are limited to a single connection so every query
/// sees the same database.
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL is invalid or the file cannot be opened.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<SqlitePool, sqlx::Error> {
    let url = database_url.expose_secret();
    let in_memory = url.contains(":memory:") || url.contains("mode=memory");

    let mut options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(false)
        .busy_timeout(Duration::from_secs(5));
    if !in_memory {
        options = options.journal_mode(SqliteJournalMode::Wal);
    }

    let max_connections = if in_memory { 1 } else { 5 };

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}

/// Run the embedded storefront migrations.
///
/// # Errors
///
/// Returns `MigrateError` if a migration fails or the applied history does not
/// match the embedded files.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

#[cfg(test)]
pub(crate) mod testing {
    use secrecy::SecretString;
    use sqlx::SqlitePool;

    /// Fresh in-memory database with migrations applied.
    #[allow(clippy::expect_used)]
    pub async fn pool() -> SqlitePool {
        let pool = super::create_pool(&SecretString::from("sqlite::memory:"))
            .await
            .expect("in-memory pool");
        super::run_migrations(&pool).await.expect("migrations");
        pool
    }
}
