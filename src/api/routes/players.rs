use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::Json,
    Extension,
};
use serde::{Deserialize, Serialize};

use crate::api::error::{game_error, ApiError};
use crate::api::middleware::{ensure_room_access, Claims};
use crate::api::routes::rooms::SuccessResponse;
use crate::api::AppState;
use crate::application::player::{
    EliminatePlayer, EliminatePlayerInput, GetPlayer, GetPlayerInput, UpdateScore, UpdateScoreInput,
};
use crate::domain::entities::Player;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateScoreRequest {
    pub score_increase: i64,
}

/// Load a player and check the caller's token covers its room
async fn load_visible_player(
    state: &AppState,
    claims: &Claims,
    player_id: String,
) -> Result<Player, ApiError> {
    let player = GetPlayer::new(state.room_repo.clone())
        .execute(GetPlayerInput { player_id })
        .await
        .map_err(game_error)?;

    ensure_room_access(claims, &player.room_id)?;
    Ok(player)
}

/// GET /api/players/:playerId
pub async fn get_player(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(player_id): Path<String>,
) -> Result<Json<Player>, ApiError> {
    let player = load_visible_player(&state, &claims, player_id).await?;
    Ok(Json(player))
}

/// POST /api/players/:playerId/eliminate
pub async fn eliminate_player(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(player_id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let player = load_visible_player(&state, &claims, player_id).await?;

    let use_case = EliminatePlayer::new(state.room_repo.clone());
    let result = use_case
        .execute(EliminatePlayerInput {
            player_id: player.id,
        })
        .await
        .map_err(game_error)?;

    state.publish_snapshot(&result.room_id, "playerEliminated").await;

    Ok(Json(SuccessResponse { success: true }))
}

/// POST /api/players/:playerId/score - Adjust a score, never below zero
pub async fn update_score(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(player_id): Path<String>,
    Json(body): Json<UpdateScoreRequest>,
) -> Result<Json<Player>, ApiError> {
    let player = load_visible_player(&state, &claims, player_id).await?;

    let use_case = UpdateScore::new(state.room_repo.clone());
    let updated = use_case
        .execute(UpdateScoreInput {
            player_id: player.id,
            score_increase: body.score_increase,
        })
        .await
        .map_err(game_error)?;

    state.publish_snapshot(&updated.room_id, "scoreUpdated").await;

    Ok(Json(updated))
}
