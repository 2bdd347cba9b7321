//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::SqlitePool;

use huerto_core::UserId;

use crate::config::StorefrontConfig;
use crate::db::{CartRepository, ProductRepository, RepositoryError, UserRepository};
use crate::models::User;
use crate::services::auth::AuthService;
use crate::views::{AdminView, CartView, CartViews, CatalogView, LoginView, RegistrationView};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections, configuration and the
/// view-state holders.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: SqlitePool,
    products: ProductRepository,
    auth: AuthService,
    catalog: CatalogView,
    carts: CartViews,
    admin_views: Cache<UserId, AdminView>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Starts the live catalog, so this must run inside a Tokio runtime.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `pool` - `SQLite` connection pool (migrated)
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: SqlitePool) -> Self {
        let products = ProductRepository::new(pool.clone());
        let auth = AuthService::new(UserRepository::new(pool.clone()));
        let catalog = CatalogView::start(products.clone(), config.seed_catalog);
        let carts = CartViews::new(CartRepository::new(pool.clone()));
        let admin_views = Cache::builder()
            .max_capacity(100)
            .time_to_idle(Duration::from_secs(1800))
            .build();

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                products,
                auth,
                catalog,
                carts,
                admin_views,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    /// Get a reference to the product repository.
    #[must_use]
    pub fn products(&self) -> &ProductRepository {
        &self.inner.products
    }

    /// Get a reference to the authentication service.
    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    /// The live catalog.
    #[must_use]
    pub fn catalog(&self) -> &CatalogView {
        &self.inner.catalog
    }

    /// Per-user cart views.
    #[must_use]
    pub fn carts(&self) -> &CartViews {
        &self.inner.carts
    }

    /// The loaded cart of a user.
    ///
    /// # Errors
    ///
    /// Returns the load error if the cart could not be read.
    pub async fn cart(&self, user_id: UserId) -> Result<CartView, Arc<RepositoryError>> {
        self.inner.carts.get(user_id).await
    }

    /// The admin editor state of an admin user, started on first use.
    pub async fn admin_view(&self, user_id: UserId) -> AdminView {
        let products = self.inner.products.clone();
        self.inner
            .admin_views
            .get_with(user_id, async move { AdminView::start(products) })
            .await
    }

    /// A fresh login flow.
    #[must_use]
    pub fn login_view(&self) -> LoginView {
        LoginView::new(self.inner.auth.clone(), self.inner.carts.clone())
    }

    /// A login flow for a user restored from the session.
    #[must_use]
    pub fn signed_in_view(&self, user: User) -> LoginView {
        LoginView::signed_in(self.inner.auth.clone(), self.inner.carts.clone(), user)
    }

    /// A fresh registration flow.
    #[must_use]
    pub fn registration_view(&self) -> RegistrationView {
        RegistrationView::new(self.inner.auth.clone())
    }
}
