//! Product route handlers.
//!
//! Listings come from the live catalog, so they may lag a write by one
//! reload. The stream endpoint pushes every new catalog snapshot.

use std::convert::Infallible;

use async_stream::stream;
use axum::{
    Json,
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::Stream;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use huerto_core::ProductId;

use crate::error::{AppError, Result};
use crate::models::Product;
use crate::state::AppState;

/// Listing filter.
#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    /// Exact category name, e.g. `Fruta`.
    pub category: Option<String>,
}

/// Catalog listing body.
#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub products: Vec<Product>,
    pub loading: bool,
    pub error: Option<String>,
}

/// List the catalog, optionally filtered by category.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Json<CatalogResponse> {
    let catalog = state.catalog();
    let snapshot = catalog.state();

    let products = match query.category.as_deref() {
        Some(category) => catalog.by_category(category),
        None => snapshot.products,
    };

    Json(CatalogResponse {
        products,
        loading: snapshot.loading,
        error: snapshot.error,
    })
}

/// Show one product.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    state
        .products()
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}

/// Server-sent events carrying the catalog after every change.
///
/// The current snapshot is sent first.
pub async fn stream_catalog(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let mut rx = state.catalog().subscribe();

    let events = stream! {
        loop {
            let snapshot = rx.borrow_and_update().clone();
            match Event::default().event("catalog").json_data(&snapshot) {
                Ok(event) => yield Ok(event),
                Err(e) => tracing::warn!(error = %e, "failed to encode catalog event"),
            }
            if rx.changed().await.is_err() {
                break;
            }
        }
    };

    Sse::new(events).keep_alive(KeepAlive::default())
}
