//! Sign-in error types.

use thiserror::Error;

/// Errors that can occur while signing a shopper in.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] zenos_core::EmailError),

    /// Invalid credentials (wrong password or unknown account).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The account exists but has been disabled.
    #[error("account disabled")]
    UserDisabled,

    /// The provider is throttling sign-in attempts.
    #[error("too many attempts, try again later")]
    TooManyAttempts,

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider rejected the request for another reason.
    #[error("identity provider error: {status} - {message}")]
    Provider { status: u16, message: String },
}

impl AuthError {
    /// Message safe to show on the login form.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidEmail(_) => "Please enter a valid email address.",
            Self::InvalidCredentials => "Invalid email or password.",
            Self::UserDisabled => "This account has been disabled.",
            Self::TooManyAttempts => "Too many attempts. Please try again later.",
            Self::Http(_) | Self::Provider { .. } => {
                "Sign-in is unavailable right now. Please try again later."
            }
        }
    }
}
