//! Services the storefront calls out to.
//!
//! - `auth` - Shopper sign-in via Firebase Authentication

pub mod auth;
