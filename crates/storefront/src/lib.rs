//! Zenos Storefront library.
//!
//! The storefront as a library, so the binary, the CLI and the integration
//! tests share one router and one feed implementation.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod countries;
pub mod error;
pub mod feed;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

pub use routes::app;
pub use state::AppState;
