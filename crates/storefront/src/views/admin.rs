//! Admin product editor state.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tracing::instrument;

use huerto_core::ProductId;

use super::{LiveProducts, ProductListState};
use crate::db::{ProductRepository, RepositoryError};
use crate::models::Product;

/// What the admin screen shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminState {
    pub products: Vec<Product>,
    pub loading: bool,
    pub error: Option<String>,
    /// Product open in the editor.
    pub selected: Option<Product>,
}

impl Default for AdminState {
    fn default() -> Self {
        Self {
            products: Vec::new(),
            loading: true,
            error: None,
            selected: None,
        }
    }
}

impl ProductListState for AdminState {
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

/// Live product list with an editor selection, one per admin.
#[derive(Clone)]
pub struct AdminView {
    feed: Arc<LiveProducts<AdminState>>,
}

impl AdminView {
    /// Start following the product table.
    #[must_use]
    pub fn start(products: ProductRepository) -> Self {
        Self {
            feed: LiveProducts::start(products, AdminState::default(), false),
        }
    }

    /// Current snapshot.
    #[must_use]
    pub fn state(&self) -> AdminState {
        self.feed.state()
    }

    /// Follow admin screen changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AdminState> {
        self.feed.subscribe()
    }

    /// Reload the product list now.
    pub async fn refresh(&self) {
        self.feed.refresh().await;
    }

    /// Open a product in the editor. A missing id clears the selection.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the product cannot be read.
    pub async fn select(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = self.feed.products().get_by_id(id).await?;
        let selected = product.clone();
        self.feed.modify(|s| s.selected = selected);
        Ok(product)
    }

    /// Store a product: insert when its id is unassigned, update otherwise.
    ///
    /// Returns the stored product and reloads the list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` when updating a product that no
    /// longer exists, `RepositoryError::Database` for other failures.
    #[instrument(skip_all, fields(product_id = %product.id))]
    pub async fn save(&self, product: &Product) -> Result<Product, RepositoryError> {
        let stored = if product.id.is_unassigned() {
            self.feed.products().insert(product).await?
        } else {
            self.feed.products().update(product).await?;
            product.clone()
        };

        tracing::info!(product_id = %stored.id, name = %stored.name, "product saved");
        self.feed.refresh().await;
        Ok(stored)
    }

    /// Delete a product. Returns whether it existed.
    ///
    /// The selection is cleared when it pointed at the deleted product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the delete fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let deleted = self.feed.products().delete(id).await?;
        if deleted {
            tracing::info!(product_id = %id, "product deleted");
            self.feed.modify(|s| {
                if s.selected.as_ref().is_some_and(|p| p.id == id) {
                    s.selected = None;
                }
            });
            self.feed.refresh().await;
        }
        Ok(deleted)
    }

    /// Close the editor.
    pub fn clear_selection(&self) {
        self.feed.modify(|s| s.selected = None);
    }
}
