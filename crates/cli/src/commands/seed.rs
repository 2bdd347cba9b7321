//! Seed the catalog with the starter products.
//!
//! Without `--force` nothing is written unless the catalog is empty. With
//! `--force` every starter product whose id is free is inserted; existing
//! rows are never touched.

use huerto_storefront::db::ProductRepository;
use huerto_storefront::services::seed::{initial_products, seed_catalog_if_empty};

use super::{CommandError, connect};

/// Seed the starter products.
///
/// # Arguments
///
/// * `force` - Insert missing starter products into a non-empty catalog
///
/// # Errors
///
/// Returns an error if the database cannot be opened or the insert fails.
pub async fn catalog(force: bool) -> Result<u64, CommandError> {
    let pool = connect().await?;
    huerto_storefront::db::run_migrations(&pool).await?;
    let products = ProductRepository::new(pool);

    let inserted = if force {
        products.insert_initial(&initial_products()).await?
    } else {
        seed_catalog_if_empty(&products).await?
    };

    if inserted == 0 {
        tracing::info!("Catalog already has products, nothing inserted");
    } else {
        tracing::info!(inserted, "Starter products inserted");
    }

    Ok(inserted)
}
