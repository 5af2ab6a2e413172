//! Live listing view over WebSocket.
//!
//! Each connection owns one [`FeedSession`]. The client sends filter edits:
//!
//! ```json
//! {"type": "query", "value": "Civ"}
//! {"type": "country", "value": "Japan"}
//! ```
//!
//! and receives a [`FeedView`](crate::feed::FeedView) whenever the view
//! changes: on connect, on each feed snapshot, when a typed query settles,
//! and on each country change. The session is closed when the socket is.

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::home::ListingQuery;
use crate::error::add_breadcrumb;
use crate::feed::FeedSession;
use crate::state::AppState;

/// A filter edit from the client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ClientMessage {
    Query(String),
    Country(String),
}

/// Whether the view must be pushed right away after a client message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// The change is already applied; send the view now.
    SendView,
    /// The change is pending (debounced); nothing to send yet.
    Wait,
}

/// Apply a client message to the session.
pub fn apply_client_message(session: &mut FeedSession, message: ClientMessage) -> Reply {
    match message {
        ClientMessage::Query(query) => {
            session.set_query(query);
            Reply::Wait
        }
        ClientMessage::Country(country) => {
            add_breadcrumb(
                "listings",
                "Changed country filter",
                Some(&[("country", country.as_str())]),
            );
            session.set_country(country);
            Reply::SendView
        }
    }
}

/// Upgrade to a live listing session. `?q=` and `?country=` seed the filters.
pub async fn listings_socket(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Response {
    ws.on_upgrade(move |socket| run_session(socket, state, query))
}

async fn run_session(mut socket: WebSocket, state: AppState, query: ListingQuery) {
    let debounce = state.config().feed.search_debounce;
    let mut session = FeedSession::with_filter(state.feed(), debounce, query.filter());
    info!("Live listing session opened");

    if send_view(&mut socket, &session).await.is_err() {
        session.close();
        return;
    }

    loop {
        tokio::select! {
            incoming = socket.recv() => {
                let text = match incoming {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                    Some(Ok(_)) => continue,
                };
                let message = match serde_json::from_str::<ClientMessage>(text.as_str()) {
                    Ok(message) => message,
                    Err(e) => {
                        debug!(error = %e, "Ignoring malformed client message");
                        continue;
                    }
                };
                if apply_client_message(&mut session, message) == Reply::SendView
                    && send_view(&mut socket, &session).await.is_err()
                {
                    break;
                }
            }
            change = session.next_change() => {
                if change.is_none() {
                    break;
                }
                if send_view(&mut socket, &session).await.is_err() {
                    break;
                }
            }
        }
    }

    session.close();
    info!("Live listing session closed");
}

async fn send_view(socket: &mut WebSocket, session: &FeedSession) -> Result<(), axum::Error> {
    let payload = match serde_json::to_string(&session.view()) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "Failed to serialize listing view");
            return Ok(());
        }
    };
    socket.send(Message::Text(payload.into())).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use zenos_core::{Listing, ListingId};

    use super::*;
    use crate::feed::{ListingFeed, MemorySource};

    #[test]
    fn test_parse_client_messages() {
        assert_eq!(
            serde_json::from_str::<ClientMessage>(r#"{"type":"query","value":"Civ"}"#).unwrap(),
            ClientMessage::Query("Civ".to_string())
        );
        assert_eq!(
            serde_json::from_str::<ClientMessage>(r#"{"type":"country","value":"Japan"}"#)
                .unwrap(),
            ClientMessage::Country("Japan".to_string())
        );
        assert!(
            serde_json::from_str::<ClientMessage>(r#"{"type":"sort","value":"price"}"#).is_err()
        );
    }

    #[tokio::test]
    async fn test_country_replies_now_query_waits() {
        let source = MemorySource::new(vec![Listing {
            id: ListingId::new("1"),
            title: "Civic".to_string(),
            country: "Japan".to_string(),
            ..Listing::default()
        }]);
        let feed = ListingFeed::new(Arc::new(source));
        feed.start();
        feed.wait_ready().await;
        let mut session = FeedSession::new(&feed, Duration::from_millis(500));

        let reply = apply_client_message(&mut session, ClientMessage::Country("Germany".into()));
        assert_eq!(reply, Reply::SendView);
        assert!(session.view().listings.is_empty());

        let reply = apply_client_message(&mut session, ClientMessage::Query("Civ".into()));
        assert_eq!(reply, Reply::Wait);
        assert_eq!(session.raw_query(), "Civ");
    }
}
