//! Product editor route handlers (administrators only).
//!
//! Each admin works on their own editor state. Writes refresh the live
//! catalog before answering.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use huerto_core::ProductId;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::RequireAdmin;
use crate::models::{Product, ProductInput};
use crate::state::AppState;
use crate::views::AdminState;

/// The editor's product list.
#[instrument(skip(state, admin), fields(user_id = %admin.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Json<AdminState> {
    let view = state.admin_view(admin.id).await;
    view.refresh().await;
    Json(view.state())
}

/// Select a product for editing.
#[instrument(skip(state, admin), fields(user_id = %admin.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let view = state.admin_view(admin.id).await;
    view.select(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}

/// Create a product.
#[instrument(skip(state, admin, input), fields(user_id = %admin.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<ProductInput>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = input.into_product(ProductId::UNASSIGNED)?;

    let view = state.admin_view(admin.id).await;
    let saved = view.save(&product).await?;
    state.catalog().refresh().await;

    add_breadcrumb("admin", "Product created", Some(&[("name", saved.name.as_str())]));
    tracing::info!(product_id = %saved.id, "product created");
    Ok((StatusCode::CREATED, Json(saved)))
}

/// Replace a product's fields.
#[instrument(skip(state, admin, input), fields(user_id = %admin.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
    Json(input): Json<ProductInput>,
) -> Result<Json<Product>> {
    if id.is_unassigned() {
        return Err(AppError::BadRequest("product id is required".to_owned()));
    }
    let product = input.into_product(id)?;

    let view = state.admin_view(admin.id).await;
    let saved = view.save(&product).await?;
    state.catalog().refresh().await;

    tracing::info!(product_id = %saved.id, "product updated");
    Ok(Json(saved))
}

/// Delete a product.
#[instrument(skip(state, admin), fields(user_id = %admin.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    let view = state.admin_view(admin.id).await;
    if !view.delete(id).await? {
        return Err(AppError::NotFound(format!("product {id}")));
    }
    state.catalog().refresh().await;

    tracing::info!(product_id = %id, "product deleted");
    Ok(StatusCode::NO_CONTENT)
}
