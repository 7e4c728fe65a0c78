use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use serde::{Deserialize, Serialize};

use crate::api::error::{api_error, game_error, ApiError};
use crate::api::middleware::{ensure_room_access, Claims};
use crate::api::AppState;
use crate::application::player::{ListPlayers, ListPlayersInput};
use crate::application::room::{
    CreateRoom, CreateRoomInput, GetGameState, GetGameStateInput, GetRoomByCode,
    GetRoomByCodeInput, GetRoomSnapshot, GetRoomSnapshotInput, JoinRoom, JoinRoomInput, LeaveRoom,
    LeaveRoomInput, StartGame, StartGameInput,
};
use crate::domain::entities::Player;
use crate::domain::value_objects::{GameStateView, RoomSnapshot};
use crate::infrastructure::services::Subscriber;

// ============================================================================
// Request/Response DTOs
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    pub host_display_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomResponse {
    pub room_id: String,
    pub join_code: String,
    pub host_player_id: String,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomRequest {
    pub display_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomResponse {
    pub room_id: String,
    pub player_id: String,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StartGameRequest {
    pub topic: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartGameResponse {
    pub success: bool,
    pub impostor_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRoomResponse {
    pub success: bool,
    pub room_closed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_host_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

fn token_error(e: impl std::fmt::Display) -> ApiError {
    api_error(StatusCode::INTERNAL_SERVER_ERROR, "TOKEN_ERROR", e.to_string())
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /api/rooms - Create a room and its host
pub async fn create_room(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<CreateRoomResponse>), ApiError> {
    let use_case = CreateRoom::new(state.room_repo.clone(), state.rules);
    let result = use_case
        .execute(CreateRoomInput {
            host_display_name: body.host_display_name,
        })
        .await
        .map_err(game_error)?;

    let token = state
        .jwt_service
        .sign(&result.host_player_id, &result.room_id)
        .map_err(token_error)?;

    Ok((
        StatusCode::CREATED,
        Json(CreateRoomResponse {
            room_id: result.room_id,
            join_code: result.join_code,
            host_player_id: result.host_player_id,
            token,
        }),
    ))
}

/// GET /api/rooms/code/:joinCode - Room with its players, or null
pub async fn get_room_by_code(
    State(state): State<Arc<AppState>>,
    Path(join_code): Path<String>,
) -> Result<Json<Option<GameStateView>>, ApiError> {
    let use_case = GetRoomByCode::new(state.room_repo.clone());
    let room = use_case
        .execute(GetRoomByCodeInput { join_code })
        .await
        .map_err(game_error)?;

    Ok(Json(room))
}

/// POST /api/rooms/code/:joinCode/join - Join a lobby
pub async fn join_room(
    State(state): State<Arc<AppState>>,
    Path(join_code): Path<String>,
    Json(body): Json<JoinRoomRequest>,
) -> Result<(StatusCode, Json<JoinRoomResponse>), ApiError> {
    let use_case = JoinRoom::new(state.room_repo.clone(), state.rules);
    let result = use_case
        .execute(JoinRoomInput {
            join_code,
            display_name: body.display_name,
        })
        .await
        .map_err(game_error)?;

    let token = state
        .jwt_service
        .sign(&result.player_id, &result.room_id)
        .map_err(token_error)?;

    state.publish_snapshot(&result.room_id, "playerJoined").await;

    Ok((
        StatusCode::CREATED,
        Json(JoinRoomResponse {
            room_id: result.room_id,
            player_id: result.player_id,
            token,
        }),
    ))
}

/// GET /api/rooms/:roomId/state - Room with resolved players and current player
pub async fn get_game_state(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(room_id): Path<String>,
) -> Result<Json<GameStateView>, ApiError> {
    ensure_room_access(&claims, &room_id)?;

    let use_case = GetGameState::new(state.room_repo.clone());
    let view = use_case
        .execute(GetGameStateInput { room_id })
        .await
        .map_err(game_error)?;

    Ok(Json(view))
}

/// GET /api/rooms/:roomId/snapshot - Versioned room snapshot for polling clients
pub async fn get_room_snapshot(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomSnapshot>, ApiError> {
    ensure_room_access(&claims, &room_id)?;

    let use_case = GetRoomSnapshot::new(state.room_repo.clone());
    let snapshot = use_case
        .execute(GetRoomSnapshotInput { room_id })
        .await
        .map_err(game_error)?;

    Ok(Json(snapshot))
}

/// GET /api/rooms/:roomId/players - Players indexed under the room
pub async fn list_players(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(room_id): Path<String>,
) -> Result<Json<Vec<Player>>, ApiError> {
    ensure_room_access(&claims, &room_id)?;

    let use_case = ListPlayers::new(state.room_repo.clone());
    let players = use_case
        .execute(ListPlayersInput { room_id })
        .await
        .map_err(game_error)?;

    Ok(Json(players))
}

/// GET /api/rooms/:roomId/connected - Open event streams on the room
pub async fn get_connected_players(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(room_id): Path<String>,
) -> Result<Json<Vec<Subscriber>>, ApiError> {
    ensure_room_access(&claims, &room_id)?;
    Ok(Json(state.session_manager.get_room_subscribers(&room_id)))
}

/// POST /api/rooms/:roomId/start - Host starts the first round
pub async fn start_game(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(room_id): Path<String>,
    Json(body): Json<StartGameRequest>,
) -> Result<Json<StartGameResponse>, ApiError> {
    ensure_room_access(&claims, &room_id)?;

    let use_case = StartGame::new(state.room_repo.clone(), state.rules);
    let result = use_case
        .execute(StartGameInput {
            room_id: room_id.clone(),
            player_id: claims.player_id.clone(),
            topic: body.topic,
            seed: None,
        })
        .await
        .map_err(game_error)?;

    state.publish_snapshot(&room_id, "gameStarted").await;

    Ok(Json(StartGameResponse {
        success: true,
        impostor_id: result.impostor_id,
    }))
}

/// POST /api/rooms/:roomId/leave - The token's player leaves the room
pub async fn leave_room(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(room_id): Path<String>,
) -> Result<Json<LeaveRoomResponse>, ApiError> {
    ensure_room_access(&claims, &room_id)?;

    let use_case = LeaveRoom::new(state.room_repo.clone());
    let result = use_case
        .execute(LeaveRoomInput {
            player_id: claims.player_id.clone(),
        })
        .await
        .map_err(game_error)?;

    state.publish_snapshot(&result.room_id, "playerLeft").await;

    Ok(Json(LeaveRoomResponse {
        success: true,
        room_closed: result.room_closed,
        new_host_id: result.new_host_id,
    }))
}
