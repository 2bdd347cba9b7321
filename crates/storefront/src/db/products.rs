//! Product repository for database operations.
//!
//! Besides plain CRUD, the repository publishes a change counter: every
//! successful write bumps it, and observers holding a [`watch::Receiver`]
//! re-query the catalog when it moves.

use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use sqlx::SqlitePool;
use tokio::sync::watch;

use huerto_core::{Price, ProductId};

use super::RepositoryError;
use crate::models::Product;

const PRODUCT_COLUMNS: &str =
    "id, name, description, price, stock, category, origin, image_url";

#[derive(sqlx::FromRow)]
pub(super) struct ProductRow {
    id: i64,
    name: String,
    description: String,
    price: String,
    stock: i64,
    category: String,
    origin: String,
    image_url: String,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let amount = Decimal::from_str(&row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!(
                "invalid price {:?} for product {}: {e}",
                row.price, row.id
            ))
        })?;

        Ok(Self {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            price: Price::clp(amount),
            stock: row.stock,
            category: row.category,
            origin: row.origin,
            image_url: row.image_url,
        })
    }
}

fn into_products(rows: Vec<ProductRow>) -> Result<Vec<Product>, RepositoryError> {
    rows.into_iter().map(Product::try_from).collect()
}

/// Repository for product database operations.
///
/// Clones share the pool and the change feed.
#[derive(Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
    changes: Arc<watch::Sender<u64>>,
}

impl ProductRepository {
    /// Create a new product repository.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            pool,
            changes: Arc::new(changes),
        }
    }

    /// Subscribe to catalog changes.
    ///
    /// The value is a version counter; only the fact that it changed matters.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    fn notify(&self) {
        self.changes.send_modify(|version| *version = version.wrapping_add(1));
    }

    /// All products, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored price is invalid.
    pub async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        into_products(rows)
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored price is invalid.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// Products in one category, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_category(&self, category: &str) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE category = ? ORDER BY id"
        ))
        .bind(category)
        .fetch_all(&self.pool)
        .await?;

        into_products(rows)
    }

    /// Number of products in the catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Insert a product, replacing any existing row with the same id.
    ///
    /// A product with an unassigned id gets a fresh one. Returns the stored
    /// product with its id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(&self, product: &Product) -> Result<Product, RepositoryError> {
        let id = (!product.id.is_unassigned()).then_some(product.id);

        let assigned = sqlx::query_scalar::<_, i64>(
            r"
            INSERT OR REPLACE INTO products
                (id, name, description, price, stock, category, origin, image_url)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            ",
        )
        .bind(id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price.amount.to_string())
        .bind(product.stock)
        .bind(&product.category)
        .bind(&product.origin)
        .bind(&product.image_url)
        .fetch_one(&self.pool)
        .await?;

        self.notify();

        Ok(Product {
            id: ProductId::new(assigned),
            ..product.clone()
        })
    }

    /// Update an existing product by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this id.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(&self, product: &Product) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE products
            SET name = ?, description = ?, price = ?, stock = ?,
                category = ?, origin = ?, image_url = ?
            WHERE id = ?
            ",
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price.amount.to_string())
        .bind(product.stock)
        .bind(&product.category)
        .bind(&product.origin)
        .bind(&product.image_url)
        .bind(product.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.notify();
        Ok(())
    }

    /// Delete a product by id.
    ///
    /// Cart lines pointing at the product are left in place.
    ///
    /// # Returns
    ///
    /// Returns `true` if the product was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            self.notify();
        }
        Ok(deleted)
    }

    /// Bulk insert, skipping products whose id already exists.
    ///
    /// Runs in one transaction. Returns the number of rows inserted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any insert fails; nothing is
    /// inserted in that case.
    pub async fn insert_initial(&self, products: &[Product]) -> Result<u64, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for product in products {
            let id = (!product.id.is_unassigned()).then_some(product.id);
            let result = sqlx::query(
                r"
                INSERT OR IGNORE INTO products
                    (id, name, description, price, stock, category, origin, image_url)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                ",
            )
            .bind(id)
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price.amount.to_string())
            .bind(product.stock)
            .bind(&product.category)
            .bind(&product.origin)
            .bind(&product.image_url)
            .execute(&mut *tx)
            .await?;
            inserted += result.rows_affected();
        }

        tx.commit().await?;

        if inserted > 0 {
            self.notify();
        }
        Ok(inserted)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::testing;

    fn clp(amount: i64) -> Price {
        Price::clp(Decimal::from(amount))
    }

    #[tokio::test]
    async fn test_insert_assigns_ids() {
        let repo = ProductRepository::new(testing::pool().await);

        let first = repo.insert(&Product::draft("Manzana Fuji", clp(1500))).await.unwrap();
        let second = repo.insert(&Product::draft("Plátano", clp(990))).await.unwrap();

        assert!(!first.id.is_unassigned());
        assert_ne!(first.id, second.id);
        assert_eq!(repo.count().await.unwrap(), 2);

        let loaded = repo.get_by_id(first.id).await.unwrap().unwrap();
        assert_eq!(loaded, first);
    }

    #[tokio::test]
    async fn test_insert_with_existing_id_replaces() {
        let repo = ProductRepository::new(testing::pool().await);
        let stored = repo.insert(&Product::draft("Tomate", clp(1200))).await.unwrap();

        let mut replacement = stored.clone();
        replacement.name = "Tomate Larga Vida".to_owned();
        repo.insert(&replacement).await.unwrap();

        assert_eq!(repo.count().await.unwrap(), 1);
        let loaded = repo.get_by_id(stored.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Tomate Larga Vida");
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let repo = ProductRepository::new(testing::pool().await);
        let mut product = repo.insert(&Product::draft("Zanahoria", clp(700))).await.unwrap();

        product.stock = 5;
        product.price = clp(750);
        repo.update(&product).await.unwrap();
        assert_eq!(repo.get_by_id(product.id).await.unwrap(), Some(product.clone()));

        assert!(repo.delete(product.id).await.unwrap());
        assert!(!repo.delete(product.id).await.unwrap());
        assert!(repo.get_by_id(product.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_product_is_not_found() {
        let repo = ProductRepository::new(testing::pool().await);
        let mut ghost = Product::draft("Fantasma", clp(1));
        ghost.id = ProductId::new(404);

        assert!(matches!(
            repo.update(&ghost).await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_list_by_category() {
        let repo = ProductRepository::new(testing::pool().await);
        let mut apple = Product::draft("Manzana", clp(1500));
        apple.category = "Fruta".to_owned();
        let mut lettuce = Product::draft("Lechuga", clp(800));
        lettuce.category = "Verdura".to_owned();
        repo.insert(&apple).await.unwrap();
        repo.insert(&lettuce).await.unwrap();

        let fruit = repo.list_by_category("Fruta").await.unwrap();
        assert_eq!(fruit.len(), 1);
        assert_eq!(fruit.first().map(|p| p.name.as_str()), Some("Manzana"));
        assert!(repo.list_by_category("Lácteos").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insert_initial_ignores_existing_ids() {
        let repo = ProductRepository::new(testing::pool().await);
        let stored = repo.insert(&Product::draft("Manzana", clp(1500))).await.unwrap();

        let mut duplicate = stored.clone();
        duplicate.name = "Otra manzana".to_owned();
        let fresh = Product::draft("Plátano", clp(990));

        let inserted = repo.insert_initial(&[duplicate, fresh]).await.unwrap();

        assert_eq!(inserted, 1);
        let kept = repo.get_by_id(stored.id).await.unwrap().unwrap();
        assert_eq!(kept.name, "Manzana");
    }

    #[tokio::test]
    async fn test_writes_bump_change_feed() {
        let repo = ProductRepository::new(testing::pool().await);
        let mut changes = repo.subscribe();
        changes.borrow_and_update();

        let product = repo.insert(&Product::draft("Pimentón", clp(1100))).await.unwrap();
        assert!(changes.has_changed().unwrap());
        changes.borrow_and_update();

        // A delete of a missing row changes nothing
        repo.delete(ProductId::new(999)).await.unwrap();
        assert!(!changes.has_changed().unwrap());

        repo.delete(product.id).await.unwrap();
        assert!(changes.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_corrupt_price_is_reported() {
        let pool = testing::pool().await;
        sqlx::query("INSERT INTO products (name, price) VALUES ('Roto', 'abc')")
            .execute(&pool)
            .await
            .unwrap();

        let repo = ProductRepository::new(pool);
        assert!(matches!(
            repo.list_all().await,
            Err(RepositoryError::DataCorruption(_))
        ));
    }
}
