//! Listing page handlers.

use std::sync::Arc;

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::instrument;
use zenos_core::{Identity, ListingFilter};

use super::Viewer;
use crate::feed::FeedView;
use crate::filters;
use crate::middleware::CurrentIdentity;
use crate::state::AppState;

/// Filter parameters shared by the listing page, the JSON API, and the
/// live socket.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub country: String,
}

impl ListingQuery {
    #[must_use]
    pub fn filter(&self) -> ListingFilter {
        ListingFilter::new(self.q.clone(), self.country.clone())
    }
}

/// Listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub viewer: Viewer,
    pub show_hero: bool,
    pub view: FeedView,
    pub countries: Arc<Vec<String>>,
}

/// Display the home page: hero plus the collection.
#[instrument(skip(state, identity))]
pub async fn home(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Query(query): Query<ListingQuery>,
) -> HomeTemplate {
    render(&state, identity.as_ref(), &query, true).await
}

/// Display the collection on its own.
#[instrument(skip(state, identity))]
pub async fn collection(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Query(query): Query<ListingQuery>,
) -> HomeTemplate {
    render(&state, identity.as_ref(), &query, false).await
}

async fn render(
    state: &AppState,
    identity: Option<&Identity>,
    query: &ListingQuery,
    show_hero: bool,
) -> HomeTemplate {
    let view = FeedView::from_snapshot(&state.feed().snapshot(), &query.filter());

    HomeTemplate {
        viewer: Viewer::new(identity, state.guard().policy()),
        show_hero,
        view,
        countries: state.countries().names().await,
    }
}
