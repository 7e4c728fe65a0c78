use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use async_broadcast::RecvError;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::Stream;
use serde::Deserialize;

use crate::api::error::{api_error, game_error, ApiError};
use crate::api::middleware::ensure_room_access;
use crate::application::room::{GetRoomSnapshot, GetRoomSnapshotInput};
use crate::infrastructure::app_state::{AppState, RoomEvent, EVENT_ROOM_CLOSED};
use crate::infrastructure::services::SessionManager;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);

#[derive(Deserialize)]
pub struct SseParams {
    token: Option<String>,
}

/// Removes the subscriber entry when the stream is dropped
struct SubscriptionGuard {
    session_manager: Arc<SessionManager>,
    subscription_id: String,
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.session_manager.disconnect(&self.subscription_id);
        tracing::debug!("SSE subscriber {} disconnected", self.subscription_id);
    }
}

fn to_sse_event(event: &RoomEvent) -> Event {
    let json = serde_json::to_string(event).unwrap_or_default();
    Event::default().event(event.event_type.as_str()).data(json)
}

/// GET /api/rooms/:roomId/events?token= - Snapshot stream for one room
///
/// Sends the current snapshot first, then every newer snapshot of the room.
/// Snapshots that arrive out of order are dropped, so versions seen by the
/// client only ever increase.
pub async fn room_events(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    Query(params): Query<SseParams>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let token = params
        .token
        .ok_or_else(|| api_error(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "Missing token"))?;
    let claims = state
        .jwt_service
        .verify(&token)
        .map_err(|e| api_error(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", e.to_string()))?;
    ensure_room_access(&claims, &room_id)?;

    // Subscribe before reading so nothing committed in between is lost
    let mut receiver = state.subscribe();
    let initial = GetRoomSnapshot::new(state.room_repo.clone())
        .execute(GetRoomSnapshotInput {
            room_id: room_id.clone(),
        })
        .await
        .map_err(game_error)?;

    let subscriber = state.session_manager.connect(&room_id, &claims.player_id);
    let guard = SubscriptionGuard {
        session_manager: state.session_manager.clone(),
        subscription_id: subscriber.subscription_id,
    };
    tracing::debug!(%room_id, player_id = %claims.player_id, "SSE stream opened");

    let stream = async_stream::stream! {
        let _guard = guard;
        let mut last_version = initial.version;

        yield Ok(to_sse_event(&RoomEvent::snapshot(initial).with_action("subscribed")));

        let mut heartbeat = tokio::time::interval_at(
            tokio::time::Instant::now() + HEARTBEAT_INTERVAL,
            HEARTBEAT_INTERVAL,
        );

        loop {
            tokio::select! {
                _ = heartbeat.tick() => {
                    yield Ok(Event::default().comment("heartbeat"));
                }
                result = receiver.recv() => {
                    match result {
                        Ok(event) if event.room_id != room_id => {}
                        Ok(event) if event.event_type == EVENT_ROOM_CLOSED => {
                            yield Ok(to_sse_event(&event));
                            break;
                        }
                        Ok(event) => {
                            if let Some(version) = event.version() {
                                if version > last_version {
                                    last_version = version;
                                    yield Ok(to_sse_event(&event));
                                }
                            }
                        }
                        Err(RecvError::Overflowed(skipped)) => {
                            // Only the latest state matters; keep going
                            tracing::warn!(%room_id, "SSE subscriber lagged, {} events skipped", skipped);
                        }
                        Err(RecvError::Closed) => {
                            tracing::warn!("Event channel closed, ending SSE stream");
                            break;
                        }
                    }
                }
            }
        }
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
