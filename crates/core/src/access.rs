//! Admin policy and the dashboard access guard.
//!
//! There is no role model: an identity is an admin when its address matches
//! the configured admin address, ignoring case. The guard itself is a pure
//! decision over the resolved identity and that flag.
//!
//! ```text
//! identity absent               -> RedirectToLogin
//! identity present, not admin   -> RedirectToHome
//! identity present, admin       -> RenderProtected
//! ```

use serde::{Deserialize, Serialize};

use crate::types::Email;

/// A signed-in user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Provider-assigned user id.
    pub uid: String,
    /// The user's address, if the provider exposes one.
    pub email: Option<Email>,
}

impl Identity {
    /// Create an identity with an address.
    #[must_use]
    pub fn new(uid: impl Into<String>, email: Option<Email>) -> Self {
        Self {
            uid: uid.into(),
            email,
        }
    }
}

/// Decides which identities count as admin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminPolicy {
    admin_email: Email,
}

impl AdminPolicy {
    /// Create a policy for a single configured admin address.
    #[must_use]
    pub const fn new(admin_email: Email) -> Self {
        Self { admin_email }
    }

    /// The configured admin address.
    #[must_use]
    pub const fn admin_email(&self) -> &Email {
        &self.admin_email
    }

    /// True when the identity is present and its address matches the admin
    /// address after lowercasing both.
    #[must_use]
    pub fn is_admin(&self, identity: Option<&Identity>) -> bool {
        identity
            .and_then(|identity| identity.email.as_ref())
            .is_some_and(|email| email.eq_ignore_case(&self.admin_email))
    }
}

/// Outcome of the guard for a protected route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessDecision {
    /// Render the protected content.
    RenderProtected,
    /// No identity: send the user to the login page.
    RedirectToLogin,
    /// Signed in without admin rights: send the user home.
    RedirectToHome,
}

impl AccessDecision {
    /// Where a redirect decision points, or `None` for `RenderProtected`.
    #[must_use]
    pub const fn redirect_path(self) -> Option<&'static str> {
        match self {
            Self::RenderProtected => None,
            Self::RedirectToLogin => Some("/login"),
            Self::RedirectToHome => Some("/"),
        }
    }
}

/// Progress of identity resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityResolution {
    /// The identity provider has not answered yet.
    Pending,
    /// Resolution finished; `None` means not signed in.
    Resolved(Option<Identity>),
}

/// What the caller should show for a protected route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    /// Identity still resolving: show a neutral loading indicator.
    Loading,
    /// Resolution finished and the guard has decided.
    Decided(AccessDecision),
}

/// The access guard for admin-only routes.
#[derive(Debug, Clone)]
pub struct AccessGuard {
    policy: AdminPolicy,
}

impl AccessGuard {
    /// Create a guard backed by an admin policy.
    #[must_use]
    pub const fn new(policy: AdminPolicy) -> Self {
        Self { policy }
    }

    /// The policy used to derive the admin flag.
    #[must_use]
    pub const fn policy(&self) -> &AdminPolicy {
        &self.policy
    }

    /// Pure decision over an identity and its admin flag.
    #[must_use]
    pub const fn decide(identity: Option<&Identity>, is_admin: bool) -> AccessDecision {
        match (identity, is_admin) {
            (None, _) => AccessDecision::RedirectToLogin,
            (Some(_), false) => AccessDecision::RedirectToHome,
            (Some(_), true) => AccessDecision::RenderProtected,
        }
    }

    /// Evaluate the guard; defers while resolution is pending.
    #[must_use]
    pub fn evaluate(&self, resolution: &IdentityResolution) -> GuardState {
        match resolution {
            IdentityResolution::Pending => GuardState::Loading,
            IdentityResolution::Resolved(identity) => {
                let identity = identity.as_ref();
                GuardState::Decided(Self::decide(identity, self.policy.is_admin(identity)))
            }
        }
    }
}
