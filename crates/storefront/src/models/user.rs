//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use huerto_core::{Email, UserId};

/// A storefront account (domain type).
///
/// The password hash is deliberately not part of this type; it is only read
/// by the login path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Delivery address, if given.
    pub address: Option<String>,
    /// Contact phone number, if given.
    pub contact_number: Option<String>,
    /// Whether the user may edit the catalog.
    pub is_admin: bool,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

/// Data needed to create an account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    /// Argon2 PHC string.
    pub password_hash: String,
    pub address: Option<String>,
    pub contact_number: Option<String>,
    pub is_admin: bool,
}

impl NewUser {
    /// A regular customer account with no address or phone.
    #[must_use]
    pub fn customer(email: Email, password_hash: String) -> Self {
        Self {
            email,
            password_hash,
            address: None,
            contact_number: None,
            is_admin: false,
        }
    }

    /// An administrator account.
    #[must_use]
    pub fn admin(email: Email, password_hash: String) -> Self {
        Self {
            is_admin: true,
            ..Self::customer(email, password_hash)
        }
    }
}
