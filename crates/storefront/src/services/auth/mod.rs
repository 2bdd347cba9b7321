//! Authentication service.
//!
//! Provides password registration and login. Passwords are stored as
//! Argon2id PHC strings.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tracing::instrument;

use huerto_core::{Email, RegistrationError, RegistrationForm};

use crate::db::UserRepository;
use crate::models::{NewUser, User};

/// Authentication service.
///
/// Handles user registration, login, and admin account provisioning.
#[derive(Clone)]
pub struct AuthService {
    users: UserRepository,
}

impl AuthService {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(users: UserRepository) -> Self {
        Self { users }
    }

    /// Register a customer account from a registration form.
    ///
    /// Form rules are checked before storage is touched; the duplicate-email
    /// check runs last.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Registration` if the form is invalid or the email is taken.
    /// Returns `AuthError::Repository` or `AuthError::PasswordHash` if storing fails.
    #[instrument(skip_all, fields(email = %form.email.trim()))]
    pub async fn register(&self, form: &RegistrationForm) -> Result<User, AuthError> {
        let email = form.validate()?;

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(RegistrationError::EmailTaken.into());
        }

        let password_hash = hash_password(&form.password)?;
        let user = self
            .users
            .register(&NewUser::customer(email, password_hash))
            .await?;

        tracing::info!(user_id = %user.id, "account registered");
        Ok(user)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    /// Returns `AuthError::Repository` if the lookup fails.
    #[instrument(skip_all)]
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .find_credentials_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(user)
    }

    /// Create an admin account unless one with this email already exists.
    ///
    /// Returns the created user, or `None` if the email was already taken.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` or `AuthError::PasswordHash` if storing fails.
    pub async fn ensure_admin(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<Option<User>, AuthError> {
        if self.users.find_by_email(email).await?.is_some() {
            return Ok(None);
        }

        self.create_admin(email, password).await.map(Some)
    }

    /// Create an admin account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Registration` if the password is shorter than the minimum.
    /// Returns `AuthError::Repository` or `AuthError::PasswordHash` if storing fails.
    pub async fn create_admin(&self, email: &Email, password: &str) -> Result<User, AuthError> {
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let user = self
            .users
            .register(&NewUser::admin(email.clone(), password_hash))
            .await?;

        tracing::info!(user_id = %user.id, email = %user.email, "admin account created");
        Ok(user)
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the user no longer exists.
    pub async fn get_user(&self, user_id: huerto_core::UserId) -> Result<User, AuthError> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::InvalidCredentials)
    }
}

/// Validate password meets the length policy.
fn validate_password(password: &str) -> Result<(), AuthError> {
    let min = huerto_core::MIN_PASSWORD_LENGTH;
    if password.chars().count() < min {
        return Err(RegistrationError::PasswordTooShort { min }.into());
    }
    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` if the password does not match or
/// the stored hash cannot be parsed.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
