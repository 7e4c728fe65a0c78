use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::Json,
    Extension,
};
use serde::{Deserialize, Serialize};

use crate::api::error::{game_error, ApiError};
use crate::api::middleware::{ensure_room_access, Claims};
use crate::api::AppState;
use crate::application::turn::{
    GetResponses, GetResponsesInput, NextTurn, NextTurnInput, SubmitResponse, SubmitResponseInput,
};
use crate::domain::services::TurnAdvance;
use crate::domain::value_objects::ResponseEntry;

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponseRequest {
    pub text: String,
}

/// Turn pointer after a submission or a skip
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnResponse {
    pub current_turn_index: u32,
    pub round_number: u32,
    pub lap_completed: bool,
}

impl From<TurnAdvance> for TurnResponse {
    fn from(advance: TurnAdvance) -> Self {
        Self {
            current_turn_index: advance.turn_index,
            round_number: advance.round_number,
            lap_completed: advance.lap_completed,
        }
    }
}

/// POST /api/rooms/:roomId/responses - The player on turn answers
pub async fn submit_response(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(room_id): Path<String>,
    Json(body): Json<SubmitResponseRequest>,
) -> Result<Json<TurnResponse>, ApiError> {
    ensure_room_access(&claims, &room_id)?;

    let use_case = SubmitResponse::new(state.room_repo.clone());
    let advance = use_case
        .execute(SubmitResponseInput {
            room_id: room_id.clone(),
            player_id: claims.player_id.clone(),
            text: body.text,
        })
        .await
        .map_err(game_error)?;

    state.publish_snapshot(&room_id, "responseSubmitted").await;

    Ok(Json(advance.into()))
}

/// GET /api/rooms/:roomId/responses - Responses of the current round
pub async fn get_responses(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(room_id): Path<String>,
) -> Result<Json<Vec<ResponseEntry>>, ApiError> {
    ensure_room_access(&claims, &room_id)?;

    let use_case = GetResponses::new(state.room_repo.clone());
    let responses = use_case
        .execute(GetResponsesInput { room_id })
        .await
        .map_err(game_error)?;

    Ok(Json(responses))
}

/// POST /api/rooms/:roomId/next-turn - Skip the player on turn
///
/// Only while the round is being played: any other phase answers
/// 409 `INVALID_PHASE`.
pub async fn next_turn(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(room_id): Path<String>,
) -> Result<Json<TurnResponse>, ApiError> {
    ensure_room_access(&claims, &room_id)?;

    let use_case = NextTurn::new(state.room_repo.clone());
    let advance = use_case
        .execute(NextTurnInput {
            room_id: room_id.clone(),
        })
        .await
        .map_err(game_error)?;

    state.publish_snapshot(&room_id, "turnAdvanced").await;

    Ok(Json(advance.into()))
}
