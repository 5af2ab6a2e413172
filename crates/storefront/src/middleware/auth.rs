//! Identity and access extractors.
//!
//! [`CurrentIdentity`] reads the signed-in identity from the session, if any.
//! [`RequireAdmin`] runs the dashboard access guard: page requests are
//! redirected to `/login` or `/`, API requests get 401 or 403.

use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::debug;
use zenos_core::{AccessDecision, GuardState, Identity, IdentityResolution};

use crate::models::session_keys;
use crate::state::AppState;

/// Extractor for the signed-in identity. Never rejects.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(CurrentIdentity(identity): CurrentIdentity) -> impl IntoResponse {
///     match identity {
///         Some(i) => format!("Signed in as {}", i.uid),
///         None => "Guest".to_string(),
///     }
/// }
/// ```
pub struct CurrentIdentity(pub Option<Identity>);

impl<S> FromRequestParts<S> for CurrentIdentity
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(session_identity(parts).await))
    }
}

/// Extractor that admits only the configured admin.
pub struct RequireAdmin(pub Identity);

/// Why the guard turned a request away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardRejection {
    /// Page request: redirect to wherever the decision points.
    Redirect(&'static str),
    /// API request without an identity.
    Unauthorized,
    /// API request from a signed-in non-admin.
    Forbidden,
    /// Identity resolution has not finished.
    Pending,
}

impl GuardRejection {
    /// Map a guard decision to a rejection, or `None` to let the request in.
    #[must_use]
    pub const fn from_decision(decision: AccessDecision, is_api: bool) -> Option<Self> {
        match (decision, is_api) {
            (AccessDecision::RenderProtected, _) => None,
            (AccessDecision::RedirectToLogin, true) => Some(Self::Unauthorized),
            (AccessDecision::RedirectToHome, true) => Some(Self::Forbidden),
            (decision, false) => match decision.redirect_path() {
                Some(path) => Some(Self::Redirect(path)),
                None => None,
            },
        }
    }
}

impl IntoResponse for GuardRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Redirect(path) => Redirect::to(path).into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::Forbidden => StatusCode::FORBIDDEN.into_response(),
            Self::Pending => (
                StatusCode::SERVICE_UNAVAILABLE,
                [(header::RETRY_AFTER, "1")],
            )
                .into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = GuardRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let is_api = is_api_request(parts);
        let identity = session_identity(parts).await;

        // The session answers synchronously, so resolution is never pending
        // here; the guard still owns that state.
        let resolution = IdentityResolution::Resolved(identity.clone());
        let GuardState::Decided(decision) = state.guard().evaluate(&resolution) else {
            return Err(GuardRejection::Pending);
        };

        if let Some(rejection) = GuardRejection::from_decision(decision, is_api) {
            debug!(path = %parts.uri.path(), ?decision, "Access guard rejected request");
            return Err(rejection);
        }

        identity.map(Self).ok_or(GuardRejection::Unauthorized)
    }
}

/// Whether the request targets the JSON API. Nested routers see the path with
/// the `/api` prefix stripped, so the original URI is checked first.
fn is_api_request(parts: &Parts) -> bool {
    parts
        .extensions
        .get::<OriginalUri>()
        .map_or(&parts.uri, |original| &original.0)
        .path()
        .starts_with("/api/")
}

async fn session_identity(parts: &Parts) -> Option<Identity> {
    let session = parts.extensions.get::<Session>()?;
    session
        .get::<Identity>(session_keys::CURRENT_IDENTITY)
        .await
        .ok()
        .flatten()
}

/// Store the signed-in identity in the session.
///
/// Cycles the session id to prevent fixation.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_identity(
    session: &Session,
    identity: &Identity,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session
        .insert(session_keys::CURRENT_IDENTITY, identity)
        .await
}

/// Remove the signed-in identity from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_identity(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<Identity>(session_keys::CURRENT_IDENTITY)
        .await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts(uri: &str, original: Option<&str>) -> Parts {
        let (mut parts, ()) = Request::builder().uri(uri).body(()).unwrap().into_parts();
        if let Some(original) = original {
            parts
                .extensions
                .insert(OriginalUri(original.parse().unwrap()));
        }
        parts
    }

    #[test]
    fn test_api_detection_sees_through_nesting() {
        assert!(is_api_request(&parts("/dashboard", Some("/api/dashboard"))));
        assert!(!is_api_request(&parts("/Dashboard", Some("/Dashboard"))));
        assert!(is_api_request(&parts("/api/dashboard", None)));
        assert!(!is_api_request(&parts("/dashboard", None)));
    }

    #[test]
    fn test_page_rejections_redirect() {
        assert_eq!(
            GuardRejection::from_decision(AccessDecision::RedirectToLogin, false),
            Some(GuardRejection::Redirect("/login"))
        );
        assert_eq!(
            GuardRejection::from_decision(AccessDecision::RedirectToHome, false),
            Some(GuardRejection::Redirect("/"))
        );
        assert_eq!(
            GuardRejection::from_decision(AccessDecision::RenderProtected, false),
            None
        );
    }

    #[test]
    fn test_api_rejections_use_status_codes() {
        assert_eq!(
            GuardRejection::from_decision(AccessDecision::RedirectToLogin, true),
            Some(GuardRejection::Unauthorized)
        );
        assert_eq!(
            GuardRejection::from_decision(AccessDecision::RedirectToHome, true),
            Some(GuardRejection::Forbidden)
        );
        assert_eq!(
            GuardRejection::from_decision(AccessDecision::RenderProtected, true),
            None
        );
    }

    #[test]
    fn test_rejection_responses() {
        let redirect = GuardRejection::Redirect("/login").into_response();
        assert_eq!(redirect.status(), StatusCode::SEE_OTHER);
        assert_eq!(redirect.headers()[header::LOCATION], "/login");

        assert_eq!(
            GuardRejection::Forbidden.into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            GuardRejection::Pending.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
