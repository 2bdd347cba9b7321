//! Cart screen state.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::Serialize;
use tokio::sync::{Mutex, watch};
use tracing::instrument;

use huerto_core::{ProductId, UserId};

use crate::db::{CartRepository, RepositoryError};
use crate::models::{CartItem, CartOverflow, CartSummary, Product};

/// What the cart screen shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CartState {
    pub items: Vec<CartItem>,
}

impl CartState {
    fn quantity_of(&self, product_id: ProductId) -> Option<i64> {
        self.items
            .iter()
            .find(|item| item.product_id == product_id)
            .map(|item| item.quantity)
    }

    #[cfg(test)]
    pub(crate) fn units(&self) -> i64 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

/// One user's cart.
///
/// Quantities are computed from the current state, so operations on the
/// same cart run one at a time.
#[derive(Clone)]
pub struct CartView {
    inner: Arc<CartViewInner>,
}

struct CartViewInner {
    user_id: UserId,
    carts: CartRepository,
    state: watch::Sender<CartState>,
    ops: Mutex<()>,
}

impl CartView {
    /// An empty cart view for `user_id`. Call [`CartView::load`] before
    /// changing quantities.
    #[must_use]
    pub fn new(carts: CartRepository, user_id: UserId) -> Self {
        let (state, _) = watch::channel(CartState::default());
        Self {
            inner: Arc::new(CartViewInner {
                user_id,
                carts,
                state,
                ops: Mutex::new(()),
            }),
        }
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.inner.user_id
    }

    /// Current snapshot.
    #[must_use]
    pub fn state(&self) -> CartState {
        self.inner.state.borrow().clone()
    }

    /// Follow cart changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartState> {
        self.inner.state.subscribe()
    }

    /// Replace the state with the stored cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the cart cannot be read.
    pub async fn load(&self) -> Result<(), RepositoryError> {
        let _guard = self.inner.ops.lock().await;
        self.reload().await
    }

    async fn reload(&self) -> Result<(), RepositoryError> {
        let items = self.inner.carts.items_for_user(self.inner.user_id).await?;
        self.inner.state.send_modify(|s| s.items = items);
        Ok(())
    }

    /// Add one unit of a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the cart cannot be written or reloaded.
    #[instrument(skip(self), fields(user_id = %self.inner.user_id))]
    pub async fn add(&self, product_id: ProductId) -> Result<(), RepositoryError> {
        let _guard = self.inner.ops.lock().await;

        let quantity = self.inner.state.borrow().quantity_of(product_id).unwrap_or(0) + 1;
        self.inner
            .carts
            .upsert_item(&CartItem::new(self.inner.user_id, product_id, quantity))
            .await?;

        self.reload().await
    }

    /// Remove one unit of a product, deleting the line at quantity 1.
    ///
    /// Products not in the cart are ignored.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the cart cannot be written or reloaded.
    #[instrument(skip(self), fields(user_id = %self.inner.user_id))]
    pub async fn remove_one(&self, product_id: ProductId) -> Result<(), RepositoryError> {
        let _guard = self.inner.ops.lock().await;

        let current = self.inner.state.borrow().quantity_of(product_id);
        let Some(quantity) = current else {
            return Ok(());
        };

        if quantity > 1 {
            self.inner
                .carts
                .upsert_item(&CartItem::new(self.inner.user_id, product_id, quantity - 1))
                .await?;
        } else {
            self.inner
                .carts
                .remove_item(self.inner.user_id, product_id)
                .await?;
        }

        self.reload().await
    }

    /// Delete every line of the cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the cart cannot be cleared.
    #[instrument(skip(self), fields(user_id = %self.inner.user_id))]
    pub async fn clear(&self) -> Result<(), RepositoryError> {
        let _guard = self.inner.ops.lock().await;

        self.inner.carts.clear(self.inner.user_id).await?;
        self.inner.state.send_modify(|s| s.items.clear());
        Ok(())
    }

    /// Cart lines, totals and unit count against the given products.
    ///
    /// Items whose product is not in `products` are left out of all three.
    ///
    /// # Errors
    ///
    /// Returns [`CartOverflow`] if the totals cannot be represented.
    pub fn summary(&self, products: &[Product]) -> Result<CartSummary, CartOverflow> {
        CartSummary::from_items(&self.inner.state.borrow().items, products)
    }
}

/// Loaded cart views, one per user.
///
/// Idle carts are evicted after an hour and reloaded from storage on the
/// next access.
#[derive(Clone)]
pub struct CartViews {
    carts: CartRepository,
    cache: Cache<UserId, CartView>,
}

impl CartViews {
    #[must_use]
    pub fn new(carts: CartRepository) -> Self {
        let cache = Cache::builder()
            .max_capacity(10_000)
            .time_to_idle(Duration::from_secs(3600))
            .build();
        Self { carts, cache }
    }

    /// The loaded cart view for a user.
    ///
    /// # Errors
    ///
    /// Returns the load error if the cart was not cached and could not be read.
    pub async fn get(&self, user_id: UserId) -> Result<CartView, Arc<RepositoryError>> {
        self.cache
            .try_get_with(user_id, async {
                let view = CartView::new(self.carts.clone(), user_id);
                view.load().await?;
                Ok::<_, RepositoryError>(view)
            })
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use huerto_core::Price;

    use super::*;
    use crate::db::{ProductRepository, testing};

    async fn setup() -> (CartRepository, Vec<Product>) {
        let pool = testing::pool().await;
        let products = ProductRepository::new(pool.clone());
        let mut stored = Vec::new();
        for (name, price) in [("Manzana Fuji", 1500), ("Plátano", 990)] {
            stored.push(
                products
                    .insert(&Product::draft(name, Price::clp(Decimal::from(price))))
                    .await
                    .unwrap(),
            );
        }
        (CartRepository::new(pool), stored)
    }

    #[tokio::test]
    async fn test_add_increments_quantity() {
        let (carts, products) = setup().await;
        let view = CartView::new(carts.clone(), UserId::new(1));
        let apple = products.first().unwrap().id;

        view.add(apple).await.unwrap();
        view.add(apple).await.unwrap();

        assert_eq!(view.state().items, vec![CartItem::new(UserId::new(1), apple, 2)]);
        assert_eq!(carts.quantity_of(UserId::new(1), apple).await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn test_remove_one_decrements_then_deletes() {
        let (carts, products) = setup().await;
        let view = CartView::new(carts.clone(), UserId::new(1));
        let apple = products.first().unwrap().id;
        view.add(apple).await.unwrap();
        view.add(apple).await.unwrap();

        view.remove_one(apple).await.unwrap();
        assert_eq!(view.state().units(), 1);

        view.remove_one(apple).await.unwrap();
        assert!(view.state().items.is_empty());
        assert_eq!(carts.quantity_of(UserId::new(1), apple).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_remove_one_ignores_missing_product() {
        let (carts, _) = setup().await;
        let view = CartView::new(carts, UserId::new(1));

        view.remove_one(ProductId::new(77)).await.unwrap();
        assert!(view.state().items.is_empty());
    }

    #[tokio::test]
    async fn test_clear_and_summary() {
        let (carts, products) = setup().await;
        let view = CartView::new(carts.clone(), UserId::new(1));
        for product in &products {
            view.add(product.id).await.unwrap();
        }
        view.add(products.first().unwrap().id).await.unwrap();

        let summary = view.summary(&products).unwrap();
        assert_eq!(summary.item_count, 3);
        assert_eq!(summary.total_display, "$3.990");

        view.clear().await.unwrap();
        assert!(view.summary(&products).unwrap().is_empty());
        assert!(carts.items_for_user(UserId::new(1)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_adds_are_not_lost() {
        let (carts, products) = setup().await;
        let view = CartView::new(carts, UserId::new(1));
        let apple = products.first().unwrap().id;

        let adds: Vec<_> = (0..5)
            .map(|_| {
                let view = view.clone();
                tokio::spawn(async move { view.add(apple).await })
            })
            .collect();
        for add in adds {
            add.await.unwrap().unwrap();
        }

        assert_eq!(view.state().units(), 5);
    }

    #[tokio::test]
    async fn test_cart_views_load_stored_cart() {
        let (carts, products) = setup().await;
        let apple = products.first().unwrap().id;
        carts
            .upsert_item(&CartItem::new(UserId::new(4), apple, 3))
            .await
            .unwrap();

        let views = CartViews::new(carts);
        let view = views.get(UserId::new(4)).await.unwrap();
        assert_eq!(view.state().units(), 3);

        // Same instance on the next access
        view.add(apple).await.unwrap();
        assert_eq!(views.get(UserId::new(4)).await.unwrap().state().units(), 4);
    }

    #[tokio::test]
    async fn test_summary_count_skips_deleted_products() {
        let (carts, products) = setup().await;
        let view = CartView::new(carts, UserId::new(1));
        for product in &products {
            view.add(product.id).await.unwrap();
            view.add(product.id).await.unwrap();
        }

        let remaining = &products[..1];
        let summary = view.summary(remaining).unwrap();
        assert_eq!(view.state().units(), 4);
        assert_eq!(summary.item_count, 2);
        assert_eq!(summary.lines.len(), 1);
    }
}
