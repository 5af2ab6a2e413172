//! Checkout page.
//!
//! Payment itself is handled by the external processor; this page shows what
//! is being bought.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::instrument;
use zenos_core::Listing;

use super::Viewer;
use crate::error::AppError;
use crate::filters;
use crate::middleware::CurrentIdentity;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CheckoutQuery {
    pub listing: Option<String>,
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout.html")]
pub struct CheckoutTemplate {
    pub viewer: Viewer,
    pub listing: Option<Listing>,
}

/// Display the checkout page.
///
/// # Errors
///
/// Returns `AppError::NotFound` if `?listing=` names a listing that is not in
/// the current snapshot.
#[instrument(skip(state, identity))]
pub async fn checkout(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Query(query): Query<CheckoutQuery>,
) -> Result<CheckoutTemplate, AppError> {
    let listing = match query.listing.as_deref().filter(|id| !id.is_empty()) {
        None => None,
        Some(id) => {
            let snapshot = state.feed().snapshot();
            let found = snapshot
                .listings
                .iter()
                .find(|listing| listing.id.as_str() == id)
                .cloned()
                .ok_or_else(|| AppError::NotFound(format!("listing {id}")))?;
            Some(found)
        }
    };

    Ok(CheckoutTemplate {
        viewer: Viewer::new(identity.as_ref(), state.guard().policy()),
        listing,
    })
}
