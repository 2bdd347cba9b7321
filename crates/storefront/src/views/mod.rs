//! View-state holders.
//!
//! Each holder owns a `tokio::sync::watch` channel of its screen state.
//! Callers read snapshots with `state()` and follow changes with
//! `subscribe()`; operations run their database calls on the runtime and
//! republish the result. Load failures land in the state as a message.
//!
//! # Holders
//!
//! - [`CatalogView`] - Live product list, seeded on first start
//! - [`CartView`] - One user's cart lines (cached per user by [`CartViews`])
//! - [`LoginView`] - Login outcome and the signed-in user
//! - [`RegistrationView`] - Registration outcome, default admin provisioning
//! - [`AdminView`] - Live product list plus the product being edited

pub mod admin;
pub mod cart;
pub mod catalog;
pub mod login;
pub mod registration;

pub use admin::{AdminState, AdminView};
pub use cart::{CartState, CartView, CartViews};
pub use catalog::{CatalogState, CatalogView};
pub use login::{LoginState, LoginView};
pub use registration::{RegistrationState, RegistrationView};

use std::sync::{Arc, OnceLock, Weak};

use tokio::sync::watch;
use tokio::task::AbortHandle;

use crate::db::ProductRepository;
use crate::models::Product;
use crate::services::seed;

/// State that mirrors the product table.
pub(crate) trait ProductListState: Clone + Send + Sync + 'static {
    fn loaded(&mut self, products: Vec<Product>);
    fn failed(&mut self, message: String);
}

/// Product list kept in sync with the repository's change feed.
///
/// A background task reloads the list on every catalog write. The task holds
/// only a weak reference and is aborted when the feed is dropped.
pub(crate) struct LiveProducts<S> {
    products: ProductRepository,
    state: watch::Sender<S>,
    task: OnceLock<AbortHandle>,
}

impl<S: ProductListState> LiveProducts<S> {
    /// Start following the catalog. With `seed`, an empty catalog first gets
    /// the starter products.
    pub(crate) fn start(products: ProductRepository, initial: S, seed: bool) -> Arc<Self> {
        let (state, _) = watch::channel(initial);
        let feed = Arc::new(Self {
            products,
            state,
            task: OnceLock::new(),
        });

        let weak = Arc::downgrade(&feed);
        let changes = feed.products.subscribe();
        let handle = tokio::spawn(follow(weak, changes, seed));
        let _ = feed.task.set(handle.abort_handle());

        feed
    }

    pub(crate) fn products(&self) -> &ProductRepository {
        &self.products
    }

    pub(crate) fn state(&self) -> S {
        self.state.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<S> {
        self.state.subscribe()
    }

    pub(crate) fn modify(&self, f: impl FnOnce(&mut S)) {
        self.state.send_modify(f);
    }

    /// Reload the list now.
    pub(crate) async fn refresh(&self) {
        match self.products.list_all().await {
            Ok(products) => self.state.send_modify(|s| s.loaded(products)),
            Err(e) => {
                tracing::error!(error = %e, "failed to load products");
                let message = format!("Error loading products: {e}");
                self.state.send_modify(|s| s.failed(message));
            }
        }
    }
}

impl<S> Drop for LiveProducts<S> {
    fn drop(&mut self) {
        if let Some(task) = self.task.get() {
            task.abort();
        }
    }
}

async fn follow<S: ProductListState>(
    feed: Weak<LiveProducts<S>>,
    mut changes: watch::Receiver<u64>,
    seed: bool,
) {
    if seed && let Some(live) = feed.upgrade() {
        if let Err(e) = seed::seed_catalog_if_empty(&live.products).await {
            tracing::error!(error = %e, "failed to seed catalog");
        }
    }

    // Writes from here on trigger a reload
    changes.borrow_and_update();

    loop {
        let Some(live) = feed.upgrade() else { break };
        live.refresh().await;
        drop(live);

        if changes.changed().await.is_err() {
            break;
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::time::Duration;

    use tokio::sync::watch;

    /// Wait (bounded) until the state satisfies `f`.
    #[allow(clippy::expect_used)]
    pub async fn wait_until<S>(rx: &mut watch::Receiver<S>, f: impl FnMut(&S) -> bool) -> S
    where
        S: Clone,
    {
        tokio::time::timeout(Duration::from_secs(5), rx.wait_for(f))
            .await
            .expect("state change timed out")
            .expect("view dropped")
            .clone()
    }
}
