//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Password registration and login
//! - `seed` - Starter catalog

pub mod auth;
pub mod seed;
