//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! hh-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - `SQLite` URL (default: `sqlite://huertohogar.db`)
//!
//! Migrations live in `crates/storefront/migrations/` and are embedded in the
//! storefront crate, so the storefront binary and this command always agree.

use super::{CommandError, connect};

/// Run storefront database migrations.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running storefront migrations...");
    huerto_storefront::db::run_migrations(&pool).await?;

    tracing::info!("Storefront migrations complete!");
    Ok(())
}
