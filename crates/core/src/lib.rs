//! Zenos Core - Shared listing types and storefront logic.
//!
//! This crate provides the types and pure logic used across all Zenos components:
//! - `storefront` - Public listing site and admin dashboard
//! - `cli` - Command-line tools for inspecting snapshots and access rules
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no timers. Everything here can be tested without a runtime.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for listing ids, prices, and emails
//! - [`listing`] - The listing record observed from the data store
//! - [`filter`] - Search and country filtering over a listing snapshot
//! - [`access`] - Admin policy and the dashboard access guard

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod access;
pub mod filter;
pub mod listing;
pub mod types;

pub use access::{AccessDecision, AccessGuard, AdminPolicy, GuardState, Identity, IdentityResolution};
pub use filter::{ListingFilter, filter_listings};
pub use listing::Listing;
pub use types::*;
