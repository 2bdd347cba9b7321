//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! # Catalog
//! GET    /api/products                 - Product listing (?category=Fruta)
//! GET    /api/products/stream          - Catalog snapshots (server-sent events)
//! GET    /api/products/{id}            - Product detail
//!
//! # Auth
//! POST   /api/auth/register            - Create an account (rate limited)
//! POST   /api/auth/login               - Sign in (rate limited)
//! POST   /api/auth/logout              - Sign out and empty the cart
//! GET    /api/auth/me                  - Signed-in account
//!
//! # Cart (requires auth)
//! GET    /api/cart                     - Cart summary
//! DELETE /api/cart                     - Empty the cart
//! GET    /api/cart/count               - Badge count
//! POST   /api/cart/add                 - Add one unit
//! POST   /api/cart/remove              - Remove one unit
//!
//! # Admin (requires admin)
//! GET    /api/admin/products           - Editor product list
//! POST   /api/admin/products           - Create a product
//! GET    /api/admin/products/{id}      - Select a product
//! PUT    /api/admin/products/{id}      - Update a product
//! DELETE /api/admin/products/{id}      - Delete a product
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the auth routes router.
///
/// Login and registration sit behind the auth rate limiter when
/// `rate_limit` is set.
pub fn auth_routes(rate_limit: bool) -> Router<AppState> {
    let mut limited = Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register));
    if rate_limit {
        limited = limited.layer(auth_rate_limiter());
    }

    Router::new()
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .merge(limited)
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/stream", get(products::stream_catalog))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/count", get(cart::count))
        .route("/add", post(cart::add))
        .route("/remove", post(cart::remove))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(admin::index).post(admin::create))
        .route(
            "/products/{id}",
            get(admin::show).put(admin::update).delete(admin::delete),
        )
}

/// Create all API routes for the storefront.
pub fn routes(rate_limit_auth: bool) -> Router<AppState> {
    Router::new()
        .nest("/api/products", product_routes())
        .nest("/api/auth", auth_routes(rate_limit_auth))
        .nest("/api/cart", cart_routes())
        .nest("/api/admin", admin_routes())
}
