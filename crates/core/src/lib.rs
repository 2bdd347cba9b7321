//! Huerto Hogar Core - Shared types library.
//!
//! This crate provides common types used across all Huerto Hogar components:
//! - `storefront` - Catalog, cart, accounts and admin API
//! - `cli` - Command-line tools for migrations, seeding and admin accounts
//!
//! # Architecture
//!
//! The core crate contains only types and validation rules - no I/O, no
//! database access, no HTTP. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices and emails
//! - [`validation`] - Registration form rules

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;
pub mod validation;

pub use types::*;
pub use validation::{MIN_PASSWORD_LENGTH, RegistrationError, RegistrationForm};
