//! JSON API.

use axum::{
    Json,
    extract::{Query, State},
};
use tracing::instrument;

use super::home::ListingQuery;
use crate::feed::FeedView;
use crate::state::AppState;

/// The filtered listing view.
#[instrument(skip(state))]
pub async fn listings(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Json<FeedView> {
    Json(FeedView::from_snapshot(
        &state.feed().snapshot(),
        &query.filter(),
    ))
}

/// Country suggestions, sorted. Empty when the directory is unreachable.
pub async fn countries(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.countries().names().await.as_ref().clone())
}
