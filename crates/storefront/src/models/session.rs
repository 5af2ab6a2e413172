//! Session keys.
//!
//! The signed-in [`Identity`](zenos_core::Identity) is stored as-is under
//! [`keys::CURRENT_IDENTITY`]; the admin flag is derived from it on each
//! request, never stored.

/// Session keys for authentication data.
pub mod keys {
    /// Key for the signed-in identity.
    pub const CURRENT_IDENTITY: &str = "current_identity";
}
