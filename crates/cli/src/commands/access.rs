//! `access`: evaluate the dashboard access guard for an address.

use std::io::Write;

use zenos_core::{AccessGuard, AdminPolicy, Email, Identity, IdentityResolution};

use super::CliError;

/// Write the guard decision for `email` (signed out when `None`).
///
/// The admin address is `admin`, or `ZENOS_ADMIN_EMAIL` when omitted.
///
/// # Errors
///
/// Returns an error if an address is malformed or no admin address is
/// configured.
pub fn run(out: &mut impl Write, email: Option<&str>, admin: Option<&str>) -> Result<(), CliError> {
    let admin = match admin {
        Some(admin) => admin.to_string(),
        None => {
            dotenvy::dotenv().ok();
            std::env::var("ZENOS_ADMIN_EMAIL")
                .map_err(|_| CliError::MissingEnvVar("ZENOS_ADMIN_EMAIL"))?
        }
    };
    let guard = AccessGuard::new(AdminPolicy::new(parse_email(&admin)?));

    let identity = email
        .map(|email| parse_email(email).map(|e| Identity::new("cli", Some(e))))
        .transpose()?;
    let is_admin = guard.policy().is_admin(identity.as_ref());
    let state = guard.evaluate(&IdentityResolution::Resolved(identity));

    writeln!(out, "admin: {is_admin}")?;
    writeln!(out, "decision: {state:?}")?;
    if let zenos_core::GuardState::Decided(decision) = state
        && let Some(path) = decision.redirect_path()
    {
        writeln!(out, "redirect: {path}")?;
    }
    Ok(())
}

fn parse_email(value: &str) -> Result<Email, CliError> {
    Email::parse(value).map_err(|e| CliError::InvalidEmail(value.to_string(), e))
}
