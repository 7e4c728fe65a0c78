pub mod health;
pub mod players;
pub mod rooms;
pub mod turns;
pub mod voting;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::api::middleware::auth_middleware;
use crate::api::sse;
use crate::api::AppState;

/// Create the main API router
pub fn create_api_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .merge(create_public_router())
        .merge(create_room_router(state.clone()))
        .merge(create_player_router(state.clone()))
        .route("/health", get(health::health_handler))
        .with_state(state)
}

/// Routes reachable before a player holds a token
fn create_public_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/rooms", post(rooms::create_room))
        .route("/rooms/code/:joinCode", get(rooms::get_room_by_code))
        .route("/rooms/code/:joinCode/join", post(rooms::join_room))
        // EventSource cannot send headers; the token travels in the query
        .route("/rooms/:roomId/events", get(sse::room_events))
}

/// Room-scoped routes (require a token for that room)
fn create_room_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/rooms/:roomId/state", get(rooms::get_game_state))
        .route("/rooms/:roomId/snapshot", get(rooms::get_room_snapshot))
        .route("/rooms/:roomId/players", get(rooms::list_players))
        .route("/rooms/:roomId/connected", get(rooms::get_connected_players))
        .route("/rooms/:roomId/start", post(rooms::start_game))
        .route("/rooms/:roomId/leave", post(rooms::leave_room))
        .route("/rooms/:roomId/next-turn", post(turns::next_turn))
        .route(
            "/rooms/:roomId/responses",
            get(turns::get_responses).post(turns::submit_response),
        )
        .route("/rooms/:roomId/voting", post(voting::start_voting_phase))
        .route(
            "/rooms/:roomId/votes",
            get(voting::get_votes).post(voting::submit_vote),
        )
        .route("/rooms/:roomId/results", post(voting::calculate_results))
        .route("/rooms/:roomId/reset", post(voting::reset_game_for_new_round))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Player routes (require a token for the player's room)
fn create_player_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/players/:playerId", get(players::get_player))
        .route("/players/:playerId/eliminate", post(players::eliminate_player))
        .route("/players/:playerId/score", post(players::update_score))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
