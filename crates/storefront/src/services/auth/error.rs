//! Authentication error types.

use std::sync::Arc;

use thiserror::Error;

use huerto_core::RegistrationError;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid credentials (unknown email, malformed email or wrong password).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Registration form rejected, or the email is already in use.
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// The user's cart could not be loaded.
    #[error("cart error: {0}")]
    Cart(#[from] Arc<RepositoryError>),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
