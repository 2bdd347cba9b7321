//! Huerto Hogar Storefront library.
//!
//! This crate provides the storefront functionality as a library,
//! allowing it to be tested and reused.
//!
//! [`build_state`] opens the database and prepares the live views;
//! [`build_router`] wraps the API routes in the session, tracing and Sentry
//! layers.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod views;

use std::time::Duration;

use axum::{Router, extract::State, http::StatusCode, routing::get};
use secrecy::ExposeSecret;
use thiserror::Error;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use config::StorefrontConfig;
use services::auth::AuthError;
use state::AppState;

/// Errors that stop the storefront from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("default admin account: {0}")]
    Admin(#[from] AuthError),
}

/// Open the database and build the application state.
///
/// Runs migrations when `auto_migrate` is set and creates the configured
/// admin account if it does not exist yet. Must run inside a Tokio runtime.
///
/// # Errors
///
/// Returns `StartupError` if the database cannot be opened or migrated, or
/// the admin account cannot be created.
pub async fn build_state(config: StorefrontConfig) -> Result<AppState, StartupError> {
    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!(in_memory = config.is_in_memory(), "database pool created");

    if config.auto_migrate {
        db::run_migrations(&pool).await?;
        tracing::info!("migrations applied");
    }

    let admin = config.default_admin.clone();
    let state = AppState::new(config, pool);

    if let Some(admin) = admin
        && let Some(user) = state
            .registration_view()
            .ensure_default_admin(&admin.email, admin.password.expose_secret())
            .await?
    {
        tracing::info!(user_id = %user.id, "default admin account created");
    }

    Ok(state)
}

/// Build the complete storefront router.
///
/// # Errors
///
/// Returns `sqlx::Error` if the session table cannot be created.
pub async fn build_router(state: AppState) -> Result<Router, sqlx::Error> {
    let session_layer = middleware::create_session_layer(state.pool(), state.config()).await?;

    let app = Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes(state.config().rate_limit_auth))
        .layer(session_layer)
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    Ok(app)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies database connectivity before returning OK.
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
