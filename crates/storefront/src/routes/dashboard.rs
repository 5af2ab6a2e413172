//! Admin dashboard.

use std::collections::BTreeSet;
use std::sync::Arc;

use askama::Template;
use askama_web::WebTemplate;
use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;
use zenos_core::Listing;

use super::Viewer;
use crate::feed::FeedSnapshot;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Feed health at a glance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub listings: usize,
    /// Distinct non-empty country values.
    pub countries: usize,
    /// Open live sessions on the feed.
    pub live_sessions: usize,
    pub version: u64,
    pub loaded: bool,
    pub error: Option<String>,
}

impl DashboardSummary {
    #[must_use]
    pub fn new(snapshot: &FeedSnapshot, live_sessions: usize) -> Self {
        let countries: BTreeSet<&str> = snapshot
            .listings
            .iter()
            .map(|l| l.country.as_str())
            .filter(|c| !c.is_empty())
            .collect();

        Self {
            listings: snapshot.listings.len(),
            countries: countries.len(),
            live_sessions,
            version: snapshot.version,
            loaded: snapshot.loaded,
            error: snapshot.error.clone(),
        }
    }
}

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub viewer: Viewer,
    pub admin_email: String,
    pub summary: DashboardSummary,
    pub listings: Arc<Vec<Listing>>,
}

/// Display the dashboard. Only the admin gets here.
#[instrument(skip_all, fields(uid = %admin.uid))]
pub async fn dashboard(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> DashboardTemplate {
    let snapshot = state.feed().snapshot();

    DashboardTemplate {
        viewer: Viewer::new(Some(&admin), state.guard().policy()),
        admin_email: admin
            .email
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
        summary: DashboardSummary::new(&snapshot, state.feed().subscriber_count()),
        listings: snapshot.listings,
    }
}

/// Dashboard summary as JSON.
pub async fn summary(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Json<DashboardSummary> {
    Json(DashboardSummary::new(
        &state.feed().snapshot(),
        state.feed().subscriber_count(),
    ))
}
