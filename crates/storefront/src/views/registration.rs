//! Registration screen state.

use serde::Serialize;
use tokio::sync::watch;
use tracing::instrument;

use huerto_core::{Email, RegistrationForm};

use crate::models::User;
use crate::services::auth::{AuthError, AuthService};

/// What the registration screen shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistrationState {
    pub registered: bool,
    pub error: Option<String>,
}

/// Registration flow for one client.
pub struct RegistrationView {
    auth: AuthService,
    state: watch::Sender<RegistrationState>,
}

impl RegistrationView {
    #[must_use]
    pub fn new(auth: AuthService) -> Self {
        let (state, _) = watch::channel(RegistrationState::default());
        Self { auth, state }
    }

    /// Current snapshot.
    #[must_use]
    pub fn state(&self) -> RegistrationState {
        self.state.borrow().clone()
    }

    /// Follow registration changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<RegistrationState> {
        self.state.subscribe()
    }

    /// Create the configured admin account if its email is not registered.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the lookup or insert fails.
    pub async fn ensure_default_admin(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<Option<User>, AuthError> {
        self.auth.ensure_admin(email, password).await
    }

    /// Register a customer account.
    ///
    /// Form problems and a taken email are shown as their own message;
    /// storage failures as `Registration failed: ...`.
    ///
    /// # Errors
    ///
    /// Returns the `AuthError` behind the message in the state.
    #[instrument(skip_all)]
    pub async fn register(&self, form: &RegistrationForm) -> Result<User, AuthError> {
        match self.auth.register(form).await {
            Ok(user) => {
                self.state.send_modify(|s| {
                    s.registered = true;
                    s.error = None;
                });
                Ok(user)
            }
            Err(e) => {
                let message = match &e {
                    AuthError::Registration(reason) => reason.to_string(),
                    other => {
                        tracing::error!(error = %other, "registration failed");
                        format!("Registration failed: {other}")
                    }
                };
                self.state.send_modify(|s| s.error = Some(message));
                Err(e)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::{UserRepository, testing};

    async fn view() -> RegistrationView {
        RegistrationView::new(AuthService::new(UserRepository::new(testing::pool().await)))
    }

    async fn error_for(view: &RegistrationView, email: &str, pass: &str, confirm: &str) -> String {
        let form = RegistrationForm::new(email, pass, confirm);
        assert!(view.register(&form).await.is_err());
        view.state().error.unwrap()
    }

    #[tokio::test]
    async fn test_register_success() {
        let view = view().await;
        let form = RegistrationForm::new("ana@example.cl", "secreto1", "secreto1");

        let user = view.register(&form).await.unwrap();

        assert_eq!(user.email.as_str(), "ana@example.cl");
        assert_eq!(
            view.state(),
            RegistrationState {
                registered: true,
                error: None
            }
        );
    }

    #[tokio::test]
    async fn test_register_error_messages() {
        let view = view().await;

        assert_eq!(
            error_for(&view, "", "secreto1", "secreto1").await,
            "All fields are required"
        );
        assert_eq!(
            error_for(&view, "ana", "secreto1", "secreto1").await,
            "The email is not valid"
        );
        assert_eq!(
            error_for(&view, "ana@example.cl", "secreto1", "secreto2").await,
            "Passwords do not match"
        );
        assert_eq!(
            error_for(&view, "ana@example.cl", "abc", "abc").await,
            "Password must be at least 6 characters"
        );
        assert!(!view.state().registered);
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let view = view().await;
        let form = RegistrationForm::new("ana@example.cl", "secreto1", "secreto1");
        view.register(&form).await.unwrap();

        assert_eq!(
            error_for(&view, "ana@example.cl", "otraclave", "otraclave").await,
            "Email is already registered"
        );
    }

    #[tokio::test]
    async fn test_storage_failure_message() {
        let pool = testing::pool().await;
        let view = RegistrationView::new(AuthService::new(UserRepository::new(pool.clone())));
        sqlx::query("DROP TABLE users").execute(&pool).await.unwrap();

        let message = error_for(&view, "ana@example.cl", "secreto1", "secreto1").await;
        assert!(message.starts_with("Registration failed:"));
    }

    #[tokio::test]
    async fn test_ensure_default_admin_once() {
        let view = view().await;
        let email = Email::parse("admin@huertohogar.com").unwrap();

        assert!(view.ensure_default_admin(&email, "admin123").await.unwrap().is_some());
        assert!(view.ensure_default_admin(&email, "admin123").await.unwrap().is_none());
    }
}
