//! Registration form rules.
//!
//! The checks run in a fixed order and stop at the first failure, so a form
//! with several problems always reports the same one.

use serde::Deserialize;
use thiserror::Error;

use crate::types::{Email, EmailError};

/// Minimum password length, counted in characters.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Reasons a registration is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// One or more fields are blank.
    #[error("All fields are required")]
    MissingFields,

    /// The email does not look like an address.
    #[error("The email is not valid")]
    InvalidEmail(#[source] EmailError),

    /// Password and confirmation differ.
    #[error("Passwords do not match")]
    PasswordMismatch,

    /// Password shorter than the minimum.
    #[error("Password must be at least {min} characters")]
    PasswordTooShort {
        /// Minimum accepted length.
        min: usize,
    },

    /// Another account already uses this email.
    #[error("Email is already registered")]
    EmailTaken,
}

/// Raw registration input as typed by the user.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationForm {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

impl RegistrationForm {
    /// Build a form from its three fields.
    #[must_use]
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        password_confirm: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            password_confirm: password_confirm.into(),
        }
    }

    /// Validate the form and return the parsed email.
    ///
    /// # Errors
    ///
    /// Returns the first failing rule: blank fields, email format,
    /// password mismatch, then password length.
    pub fn validate(&self) -> Result<Email, RegistrationError> {
        if self.email.trim().is_empty()
            || self.password.trim().is_empty()
            || self.password_confirm.trim().is_empty()
        {
            return Err(RegistrationError::MissingFields);
        }

        let email = Email::parse(&self.email).map_err(RegistrationError::InvalidEmail)?;

        if self.password != self.password_confirm {
            return Err(RegistrationError::PasswordMismatch);
        }

        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(RegistrationError::PasswordTooShort {
                min: MIN_PASSWORD_LENGTH,
            });
        }

        Ok(email)
    }
}
