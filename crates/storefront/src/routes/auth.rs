//! Authentication route handlers.
//!
//! Sign-in is delegated to the identity provider; on success the identity is
//! stored in the session and the admin is sent to the dashboard, everyone
//! else home.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{error, info, instrument, warn};
use zenos_core::Email;

use super::Viewer;
use crate::error::{AppError, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{CurrentIdentity, clear_current_identity, set_current_identity};
use crate::services::auth::AuthError;
use crate::state::AppState;

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub viewer: Viewer,
    pub error: Option<String>,
    pub email: String,
}

/// Display the login page.
pub async fn login_page(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
) -> LoginTemplate {
    LoginTemplate {
        viewer: Viewer::new(identity.as_ref(), state.guard().policy()),
        error: None,
        email: String::new(),
    }
}

/// Handle login form submission.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let email = match Email::parse(&form.email) {
        Ok(email) => email,
        Err(e) => return Ok(login_failed(AuthError::from(e), form.email)),
    };

    let identity = match state.identity().sign_in(&email, &form.password).await {
        Ok(identity) => identity,
        Err(e) => return Ok(login_failed(e, form.email)),
    };

    set_current_identity(&session, &identity).await?;
    set_sentry_user(&identity.uid, Some(email.as_str()));
    add_breadcrumb("auth", "Signed in", None);

    let is_admin = state.guard().policy().is_admin(Some(&identity));
    info!(uid = %identity.uid, is_admin, "Signed in");

    let destination = if is_admin { "/Dashboard" } else { "/" };
    Ok(Redirect::to(destination).into_response())
}

fn login_failed(err: AuthError, email: String) -> Response {
    match &err {
        AuthError::Http(_) | AuthError::Provider { .. } => {
            error!(error = %err, "Sign-in failed");
        }
        _ => warn!(error = %err, "Sign-in rejected"),
    }

    let template = LoginTemplate {
        viewer: Viewer::default(),
        error: Some(err.user_message().to_string()),
        email,
    };
    (AppError::Auth(err).status(), template).into_response()
}

/// Handle logout.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
pub async fn logout(session: Session) -> Result<Redirect, AppError> {
    clear_current_identity(&session).await?;
    clear_sentry_user();
    Ok(Redirect::to("/"))
}

/// `/admin` always points at the login page.
pub async fn admin_redirect() -> Redirect {
    Redirect::to("/login")
}
