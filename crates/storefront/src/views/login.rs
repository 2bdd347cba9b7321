//! Login screen state.

use serde::Serialize;
use tokio::sync::watch;
use tracing::instrument;

use super::CartViews;
use crate::models::User;
use crate::services::auth::{AuthError, AuthService};

/// Message shown for any failed login.
pub const LOGIN_FAILED_MESSAGE: &str = "Incorrect email or password";

/// What the login screen shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoginState {
    pub user: Option<User>,
    pub error: Option<String>,
    pub login_succeeded: bool,
    pub is_logged_in: bool,
}

/// Login flow for one client.
///
/// A successful login loads the user's cart; logout empties it.
pub struct LoginView {
    auth: AuthService,
    carts: CartViews,
    state: watch::Sender<LoginState>,
}

impl LoginView {
    /// A logged-out view.
    #[must_use]
    pub fn new(auth: AuthService, carts: CartViews) -> Self {
        let (state, _) = watch::channel(LoginState::default());
        Self { auth, carts, state }
    }

    /// A view for a user who is already signed in (e.g. from the session).
    #[must_use]
    pub fn signed_in(auth: AuthService, carts: CartViews, user: User) -> Self {
        let view = Self::new(auth, carts);
        view.state.send_modify(|s| {
            s.user = Some(user);
            s.login_succeeded = true;
            s.is_logged_in = true;
        });
        view
    }

    /// Current snapshot.
    #[must_use]
    pub fn state(&self) -> LoginState {
        self.state.borrow().clone()
    }

    /// Follow login changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<LoginState> {
        self.state.subscribe()
    }

    /// Check the credentials and, on success, load the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for an unknown email or wrong
    /// password, `AuthError::Repository` if the lookup fails. Either way the
    /// state carries [`LOGIN_FAILED_MESSAGE`].
    #[instrument(skip_all)]
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let user = match self.auth.authenticate(email, password).await {
            Ok(user) => user,
            Err(e) => {
                if !matches!(e, AuthError::InvalidCredentials) {
                    tracing::error!(error = %e, "login lookup failed");
                }
                self.state.send_modify(|s| {
                    s.error = Some(LOGIN_FAILED_MESSAGE.to_owned());
                    s.is_logged_in = false;
                });
                return Err(e);
            }
        };

        self.state.send_modify(|s| {
            s.user = Some(user.clone());
            s.error = None;
            s.login_succeeded = true;
            s.is_logged_in = true;
        });

        // The login stands even if the cart cannot be loaded yet
        if let Err(e) = self.carts.get(user.id).await {
            tracing::warn!(user_id = %user.id, error = %e, "failed to load cart after login");
        }

        tracing::info!(user_id = %user.id, "user logged in");
        Ok(user)
    }

    /// Sign out, clearing the user's cart first.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` or `AuthError::Cart` if the cart cannot
    /// be cleared; the user is signed out regardless.
    #[instrument(skip_all)]
    pub async fn logout(&self) -> Result<(), AuthError> {
        let user = self.state.borrow().user.clone();

        let cleared = match user {
            Some(user) => self.clear_cart(&user).await,
            None => Ok(()),
        };

        self.state.send_modify(|s| {
            s.user = None;
            s.login_succeeded = false;
            s.is_logged_in = false;
        });

        cleared
    }

    async fn clear_cart(&self, user: &User) -> Result<(), AuthError> {
        let cart = self.carts.get(user.id).await?;
        cart.clear().await?;
        tracing::info!(user_id = %user.id, "user logged out, cart cleared");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use huerto_core::{ProductId, RegistrationForm};

    use super::*;
    use crate::db::{CartRepository, UserRepository, testing};
    use crate::models::CartItem;

    async fn setup() -> (AuthService, CartViews, CartRepository) {
        let pool = testing::pool().await;
        let auth = AuthService::new(UserRepository::new(pool.clone()));
        auth.register(&RegistrationForm::new("ana@example.cl", "secreto1", "secreto1"))
            .await
            .unwrap();
        let carts = CartRepository::new(pool);
        (auth, CartViews::new(carts.clone()), carts)
    }

    #[tokio::test]
    async fn test_login_success_loads_cart() {
        let (auth, views, carts) = setup().await;
        let ana = auth.authenticate("ana@example.cl", "secreto1").await.unwrap();
        carts
            .upsert_item(&CartItem::new(ana.id, ProductId::new(1), 2))
            .await
            .unwrap();

        let view = LoginView::new(auth, views.clone());
        view.login("ana@example.cl", "secreto1").await.unwrap();

        let state = view.state();
        assert!(state.login_succeeded);
        assert!(state.is_logged_in);
        assert!(state.error.is_none());
        assert_eq!(state.user.map(|u| u.id), Some(ana.id));
        assert_eq!(views.get(ana.id).await.unwrap().state().units(), 2);
    }

    #[tokio::test]
    async fn test_login_failure_sets_message() {
        let (auth, views, _) = setup().await;
        let view = LoginView::new(auth, views);

        assert!(view.login("ana@example.cl", "equivocada").await.is_err());

        let state = view.state();
        assert_eq!(state.error.as_deref(), Some(LOGIN_FAILED_MESSAGE));
        assert!(!state.is_logged_in);
        assert!(state.user.is_none());
    }

    #[tokio::test]
    async fn test_logout_clears_cart() {
        let (auth, views, carts) = setup().await;
        let view = LoginView::new(auth, views.clone());
        let ana = view.login("ana@example.cl", "secreto1").await.unwrap();
        views.get(ana.id).await.unwrap().add(ProductId::new(3)).await.unwrap();

        view.logout().await.unwrap();

        let state = view.state();
        assert!(!state.is_logged_in);
        assert!(!state.login_succeeded);
        assert!(state.user.is_none());
        assert!(carts.items_for_user(ana.id).await.unwrap().is_empty());
        assert_eq!(views.get(ana.id).await.unwrap().state().units(), 0);
    }

    #[tokio::test]
    async fn test_logout_when_signed_out_is_noop() {
        let (auth, views, _) = setup().await;
        let view = LoginView::new(auth, views);

        view.logout().await.unwrap();
        assert_eq!(view.state(), LoginState::default());
    }
}
