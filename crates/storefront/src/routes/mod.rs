//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                 - Home: hero + listing cards (?q=, ?country=)
//! GET  /Home             - Listing cards without the hero
//! GET  /checkout         - Checkout page (?listing=<id>)
//!
//! # Auth
//! GET  /login            - Login page
//! POST /login            - Sign in, redirect to /Dashboard (admin) or /
//! POST /logout           - Sign out, redirect to /
//! GET  /admin            - Redirect to /login
//!
//! # Admin (access guard)
//! GET  /Dashboard        - Admin dashboard
//!
//! # API
//! GET  /api/listings     - Filtered view as JSON (?q=, ?country=)
//! GET  /api/countries    - Country suggestions
//! GET  /api/dashboard    - Admin summary as JSON (access guard)
//!
//! # Live
//! GET  /ws/listings      - Live feed session (WebSocket)
//!
//! # Health
//! GET  /health           - Liveness
//! GET  /health/ready     - Readiness (first snapshot received)
//! ```

pub mod api;
pub mod auth;
pub mod checkout;
pub mod dashboard;
pub mod health;
pub mod home;
pub mod live;

use axum::{
    Router,
    body::Body,
    http::Request,
    middleware::from_fn,
    routing::{get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};
use zenos_core::{AdminPolicy, Identity};

use crate::middleware::{create_session_layer, request_id_middleware};
use crate::state::AppState;

/// Directory served under `/static`.
pub const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Who is looking at a page, for navigation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewer {
    pub signed_in: bool,
    pub is_admin: bool,
}

impl Viewer {
    #[must_use]
    pub fn new(identity: Option<&Identity>, policy: &AdminPolicy) -> Self {
        Self {
            signed_in: identity.is_some(),
            is_admin: policy.is_admin(identity),
        }
    }
}

/// Create the JSON API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/listings", get(api::listings))
        .route("/countries", get(api::countries))
        .route("/dashboard", get(dashboard::summary))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Listing pages
        .route("/", get(home::home))
        .route("/Home", get(home::collection))
        .route("/checkout", get(checkout::checkout))
        // Auth
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/admin", get(auth::admin_redirect))
        // Admin
        .route("/Dashboard", get(dashboard::dashboard))
        // API
        .nest("/api", api_routes())
        // Live feed
        .route("/ws/listings", get(live::listings_socket))
}

/// Build the full application router: routes, static files, sessions,
/// request ids and request tracing.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(session_layer)
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use zenos_core::Email;

    use super::*;

    #[test]
    fn test_viewer() {
        let policy = AdminPolicy::new(Email::parse("admin@gmail.com").unwrap());
        let admin = Identity::new("1", Some(Email::parse("ADMIN@gmail.com").unwrap()));
        let shopper = Identity::new("2", Some(Email::parse("shopper@gmail.com").unwrap()));

        assert_eq!(Viewer::new(None, &policy), Viewer::default());
        assert_eq!(
            Viewer::new(Some(&shopper), &policy),
            Viewer {
                signed_in: true,
                is_admin: false
            }
        );
        assert!(Viewer::new(Some(&admin), &policy).is_admin);
    }
}
