//! Authentication route handlers.
//!
//! Handles registration, login and logout. The signed-in identity is kept in
//! the session; logging out also empties the user's cart.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use huerto_core::RegistrationForm;

use crate::error::{AppError, Result, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::middleware::{OptionalAuth, RequireAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, User};
use crate::state::AppState;
use crate::views::{LoginState, RegistrationState};

// =============================================================================
// Request Types
// =============================================================================

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

impl From<RegisterRequest> for RegistrationForm {
    fn from(req: RegisterRequest) -> Self {
        Self::new(req.email, req.password, req.password_confirm)
    }
}

fn session_error(e: tower_sessions::session::Error) -> AppError {
    AppError::Internal(format!("session error: {e}"))
}

// =============================================================================
// Handlers
// =============================================================================

/// Create a customer account.
///
/// Does not sign the new user in.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegistrationState>)> {
    let view = state.registration_view();
    let user = view.register(&req.into()).await?;

    tracing::info!(user_id = %user.id, "account registered");
    Ok((StatusCode::CREATED, Json(view.state())))
}

/// Sign in and load the user's cart.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginState>> {
    let view = state.login_view();
    let user = view.login(&req.email, &req.password).await?;

    set_current_user(&session, &CurrentUser::from(&user))
        .await
        .map_err(session_error)?;

    set_sentry_user(&user.id, Some(user.email.as_str()));
    add_breadcrumb("auth", "User logged in", None);
    tracing::info!(user_id = %user.id, "user logged in");

    Ok(Json(view.state()))
}

/// Sign out, emptying the cart of the signed-in user.
#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(current): OptionalAuth,
) -> Result<Json<LoginState>> {
    let mut logged_out = LoginState::default();

    if let Some(current) = current {
        let user = state.auth().get_user(current.id).await?;
        let view = state.signed_in_view(user);
        view.logout().await?;
        logged_out = view.state();
        tracing::info!(user_id = %current.id, "user logged out");
    }

    clear_current_user(&session).await.map_err(session_error)?;
    clear_sentry_user();

    Ok(Json(logged_out))
}

/// The signed-in user's account.
#[instrument(skip_all)]
pub async fn me(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<User>> {
    let user = state.auth().get_user(current.id).await?;
    Ok(Json(user))
}
