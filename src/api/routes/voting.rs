use std::collections::BTreeMap;
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
use crate::application::room::{StartVotingPhase, StartVotingPhaseInput};
use crate::application::voting::{
    CalculateResults, CalculateResultsInput, GetVotes, GetVotesInput, ResetGameForNewRound,
    ResetGameForNewRoundInput, SubmitVote, SubmitVoteInput,
};
use crate::domain::entities::Vote;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitVoteRequest {
    pub voted_for_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetRoundRequest {
    pub new_topic: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsResponse {
    pub voted_player_id: String,
    pub is_impostor_caught: bool,
    pub vote_counts: BTreeMap<String, u32>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetRoundResponse {
    pub success: bool,
    pub round_number: u32,
}

/// POST /api/rooms/:roomId/voting - Host closes the discussion
pub async fn start_voting_phase(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(room_id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    ensure_room_access(&claims, &room_id)?;

    let use_case = StartVotingPhase::new(state.room_repo.clone());
    use_case
        .execute(StartVotingPhaseInput {
            room_id: room_id.clone(),
            player_id: claims.player_id.clone(),
        })
        .await
        .map_err(game_error)?;

    state.publish_snapshot(&room_id, "votingStarted").await;

    Ok(Json(SuccessResponse { success: true }))
}

/// POST /api/rooms/:roomId/votes - Cast or change the token player's vote
pub async fn submit_vote(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(room_id): Path<String>,
    Json(body): Json<SubmitVoteRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    ensure_room_access(&claims, &room_id)?;

    let use_case = SubmitVote::new(state.room_repo.clone());
    use_case
        .execute(SubmitVoteInput {
            room_id: room_id.clone(),
            voter_id: claims.player_id.clone(),
            voted_for_id: body.voted_for_id,
        })
        .await
        .map_err(game_error)?;

    state.publish_snapshot(&room_id, "voteCast").await;

    Ok(Json(SuccessResponse { success: true }))
}

/// GET /api/rooms/:roomId/votes - Votes of the current round
pub async fn get_votes(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(room_id): Path<String>,
) -> Result<Json<Vec<Vote>>, ApiError> {
    ensure_room_access(&claims, &room_id)?;

    let use_case = GetVotes::new(state.room_repo.clone());
    let votes = use_case
        .execute(GetVotesInput { room_id })
        .await
        .map_err(game_error)?;

    Ok(Json(votes))
}

/// POST /api/rooms/:roomId/results - Tally, eliminate and score
pub async fn calculate_results(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(room_id): Path<String>,
) -> Result<Json<ResultsResponse>, ApiError> {
    ensure_room_access(&claims, &room_id)?;

    let use_case = CalculateResults::new(state.room_repo.clone(), state.rules);
    let result = use_case
        .execute(CalculateResultsInput {
            room_id: room_id.clone(),
        })
        .await
        .map_err(game_error)?;

    state.publish_snapshot(&room_id, "resultsRevealed").await;

    Ok(Json(ResultsResponse {
        voted_player_id: result.voted_player_id,
        is_impostor_caught: result.is_impostor_caught,
        vote_counts: result.vote_counts,
    }))
}

/// POST /api/rooms/:roomId/reset - Next round with a new topic
pub async fn reset_game_for_new_round(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(room_id): Path<String>,
    Json(body): Json<ResetRoundRequest>,
) -> Result<Json<ResetRoundResponse>, ApiError> {
    ensure_room_access(&claims, &room_id)?;

    let use_case = ResetGameForNewRound::new(state.room_repo.clone(), state.rules);
    let result = use_case
        .execute(ResetGameForNewRoundInput {
            room_id: room_id.clone(),
            new_topic: body.new_topic,
            seed: None,
        })
        .await
        .map_err(game_error)?;

    state.publish_snapshot(&room_id, "roundStarted").await;

    Ok(Json(ResetRoundResponse {
        success: true,
        round_number: result.round_number,
    }))
}
