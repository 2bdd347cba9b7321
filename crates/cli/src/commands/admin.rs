//! Admin account management commands.
//!
//! # Usage
//!
//! ```bash
//! hh-cli admin create -e admin@huertohogar.com -p 'a-strong-password'
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - `SQLite` URL of the storefront database
//! - `STOREFRONT_ADMIN_PASSWORD` - Used when `-p` is not given

use huerto_core::{Email, UserId};
use huerto_storefront::db::UserRepository;
use huerto_storefront::services::auth::AuthService;

use super::{CommandError, connect};

/// Create a new admin account.
///
/// # Arguments
///
/// * `email` - Admin's email address
/// * `password` - Admin's password
///
/// # Returns
///
/// The ID of the created account.
///
/// # Errors
///
/// Returns an error if the email is invalid or already registered, the
/// password is too short, or the database cannot be written.
pub async fn create_user(email: &str, password: &str) -> Result<UserId, CommandError> {
    let email = Email::parse(email).map_err(|_| CommandError::InvalidEmail(email.to_owned()))?;

    let pool = connect().await?;
    huerto_storefront::db::run_migrations(&pool).await?;
    let users = UserRepository::new(pool);

    if users.find_by_email(&email).await?.is_some() {
        return Err(CommandError::UserExists(email.into_inner()));
    }

    tracing::info!("Creating admin account: {}", email);
    let user = AuthService::new(users)
        .create_admin(&email, password)
        .await?;

    tracing::info!(
        "Admin account created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );

    Ok(user.id)
}
