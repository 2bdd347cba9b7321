//! Catalog screen state.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

use super::{LiveProducts, ProductListState};
use crate::db::ProductRepository;
use crate::models::Product;

/// What the catalog screen shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogState {
    pub products: Vec<Product>,
    /// True until the first load finishes.
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for CatalogState {
    fn default() -> Self {
        Self {
            products: Vec::new(),
            loading: true,
            error: None,
        }
    }
}

impl ProductListState for CatalogState {
    fn loaded(&mut self, products: Vec<Product>) {
        self.products = products;
        self.loading = false;
        self.error = None;
    }

    fn failed(&mut self, message: String) {
        self.error = Some(message);
        self.loading = false;
    }
}

/// Live catalog shared by every client.
#[derive(Clone)]
pub struct CatalogView {
    feed: Arc<LiveProducts<CatalogState>>,
}

impl CatalogView {
    /// Start following the product table, seeding an empty catalog first
    /// when `seed` is set.
    #[must_use]
    pub fn start(products: ProductRepository, seed: bool) -> Self {
        Self {
            feed: LiveProducts::start(products, CatalogState::default(), seed),
        }
    }

    /// Current snapshot.
    #[must_use]
    pub fn state(&self) -> CatalogState {
        self.feed.state()
    }

    /// Follow catalog changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CatalogState> {
        self.feed.subscribe()
    }

    /// Reload the product list now.
    pub async fn refresh(&self) {
        self.feed.refresh().await;
    }

    /// Products of one category from the current snapshot.
    #[must_use]
    pub fn by_category(&self, category: &str) -> Vec<Product> {
        self.feed
            .state
            .borrow()
            .products
            .iter()
            .filter(|p| p.category == category)
            .cloned()
            .collect()
    }

    /// Product with this id from the current snapshot.
    #[must_use]
    pub fn find(&self, id: huerto_core::ProductId) -> Option<Product> {
        self.feed
            .state
            .borrow()
            .products
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use huerto_core::Price;

    use super::*;
    use crate::db::testing;
    use crate::views::testing::wait_until;

    #[tokio::test]
    async fn test_start_seeds_and_loads() {
        let repo = ProductRepository::new(testing::pool().await);
        let view = CatalogView::start(repo, true);

        let mut rx = view.subscribe();
        let state = wait_until(&mut rx, |s| !s.loading).await;

        assert_eq!(state.products.len(), 6);
        assert!(state.error.is_none());
        assert_eq!(view.by_category("Fruta").len(), 2);
        assert_eq!(view.by_category("Verdura").len(), 4);
    }

    #[tokio::test]
    async fn test_start_without_seed_stays_empty() {
        let repo = ProductRepository::new(testing::pool().await);
        let view = CatalogView::start(repo, false);

        let mut rx = view.subscribe();
        let state = wait_until(&mut rx, |s| !s.loading).await;
        assert!(state.products.is_empty());
    }

    #[tokio::test]
    async fn test_follows_repository_writes() {
        let repo = ProductRepository::new(testing::pool().await);
        let view = CatalogView::start(repo.clone(), true);
        let mut rx = view.subscribe();
        wait_until(&mut rx, |s| s.products.len() == 6).await;

        let added = repo
            .insert(&Product::draft("Palta Hass", Price::clp(Decimal::from(2500))))
            .await
            .unwrap();
        wait_until(&mut rx, |s| s.products.len() == 7).await;
        assert_eq!(view.find(added.id).map(|p| p.name), Some("Palta Hass".to_owned()));

        repo.delete(added.id).await.unwrap();
        wait_until(&mut rx, |s| s.products.len() == 6).await;
        assert!(view.find(added.id).is_none());
    }

    #[tokio::test]
    async fn test_load_error_is_reported_in_state() {
        let pool = testing::pool().await;
        let view = CatalogView::start(ProductRepository::new(pool.clone()), false);
        let mut rx = view.subscribe();
        wait_until(&mut rx, |s| !s.loading).await;

        sqlx::query("DROP TABLE products").execute(&pool).await.unwrap();
        view.refresh().await;

        let state = view.state();
        assert!(!state.loading);
        assert!(
            state
                .error
                .is_some_and(|e| e.starts_with("Error loading products:"))
        );
    }
}
