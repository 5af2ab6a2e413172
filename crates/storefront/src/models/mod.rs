//! Types kept in the shopper's session.

pub mod session;

pub use session::keys as session_keys;
