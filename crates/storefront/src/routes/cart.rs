//! Cart route handlers.
//!
//! Every cart operation requires a signed-in user and answers with the
//! updated cart summary.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use huerto_core::ProductId;

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::CartSummary;
use crate::state::AppState;
use crate::views::CartView;

/// Add/remove request body.
#[derive(Debug, Deserialize)]
pub struct CartItemRequest {
    pub product_id: ProductId,
}

/// Cart badge count.
#[derive(Debug, Serialize)]
pub struct CartCount {
    pub count: i64,
}

/// Summarize the cart against the current product table.
async fn summary(state: &AppState, cart: &CartView) -> Result<Json<CartSummary>> {
    let products = state.products().list_all().await?;
    Ok(Json(cart.summary(&products)?))
}

/// Display the cart.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<CartSummary>> {
    let cart = state.cart(user.id).await?;
    summary(&state, &cart).await
}

/// Number of units in the cart, counted like the summary.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn count(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<CartCount>> {
    let cart = state.cart(user.id).await?;
    let products = state.products().list_all().await?;
    Ok(Json(CartCount {
        count: cart.summary(&products)?.item_count,
    }))
}

/// Add one unit of a product.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<CartItemRequest>,
) -> Result<Json<CartSummary>> {
    if state.products().get_by_id(req.product_id).await?.is_none() {
        return Err(AppError::NotFound(format!("product {}", req.product_id)));
    }

    let cart = state.cart(user.id).await?;
    cart.add(req.product_id).await?;
    summary(&state, &cart).await
}

/// Remove one unit of a product.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<CartItemRequest>,
) -> Result<Json<CartSummary>> {
    let cart = state.cart(user.id).await?;
    cart.remove_one(req.product_id).await?;
    summary(&state, &cart).await
}

/// Empty the cart.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn clear(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<CartSummary>> {
    let cart = state.cart(user.id).await?;
    cart.clear().await?;
    Ok(Json(CartSummary::empty()))
}
