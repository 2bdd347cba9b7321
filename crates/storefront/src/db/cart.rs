//! Cart repository for database operations.

use sqlx::SqlitePool;

use huerto_core::{ProductId, UserId};

use super::RepositoryError;
use super::products::ProductRow;
use crate::models::{CartItem, CartLine, Product};

#[derive(sqlx::FromRow)]
struct CartItemRow {
    user_id: i64,
    product_id: i64,
    quantity: i64,
}

impl From<CartItemRow> for CartItem {
    fn from(r: CartItemRow) -> Self {
        Self::new(UserId::new(r.user_id), ProductId::new(r.product_id), r.quantity)
    }
}

#[derive(sqlx::FromRow)]
struct CartLineRow {
    #[sqlx(flatten)]
    product: ProductRow,
    quantity: i64,
}

/// Repository for cart database operations.
#[derive(Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All cart lines for a user, ordered by product id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items_for_user(&self, user_id: UserId) -> Result<Vec<CartItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartItemRow>(
            r"
            SELECT user_id, product_id, quantity
            FROM cart_items
            WHERE user_id = ?
            ORDER BY product_id
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CartItem::from).collect())
    }

    /// Cart lines for a user joined with their products, ordered by product id.
    ///
    /// Lines whose product no longer exists are skipped.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored price is invalid
    /// or a line total overflows.
    pub async fn lines_for_user(&self, user_id: UserId) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartLineRow>(
            r"
            SELECT p.id, p.name, p.description, p.price, p.stock,
                   p.category, p.origin, p.image_url, c.quantity
            FROM cart_items c
            JOIN products p ON p.id = c.product_id
            WHERE c.user_id = ?
            ORDER BY p.id
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|CartLineRow { product, quantity }| {
                let product = Product::try_from(product)?;
                CartLine::new(product, quantity)
                    .map_err(|e| RepositoryError::DataCorruption(e.to_string()))
            })
            .collect::<Result<Vec<_>, RepositoryError>>()
    }

    /// Quantity of one product in a user's cart, if present.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn quantity_of(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Option<i64>, RepositoryError> {
        let quantity = sqlx::query_scalar::<_, i64>(
            "SELECT quantity FROM cart_items WHERE user_id = ? AND product_id = ?",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(quantity)
    }

    /// Insert a cart line, replacing the quantity if the line exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the quantity is not positive.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn upsert_item(&self, item: &CartItem) -> Result<(), RepositoryError> {
        if item.quantity <= 0 {
            return Err(RepositoryError::Conflict(format!(
                "cart quantity must be positive, got {}",
                item.quantity
            )));
        }

        sqlx::query(
            r"
            INSERT INTO cart_items (user_id, product_id, quantity)
            VALUES (?, ?, ?)
            ON CONFLICT (user_id, product_id) DO UPDATE SET quantity = excluded.quantity
            ",
        )
        .bind(item.user_id)
        .bind(item.product_id)
        .bind(item.quantity)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delete one cart line.
    ///
    /// # Returns
    ///
    /// Returns `true` if a line was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = ? AND product_id = ?")
            .bind(user_id)
            .bind(product_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete every cart line of a user. Returns the number of lines removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
