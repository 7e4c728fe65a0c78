use std::sync::Arc;

use uuid::Uuid;

use crate::application::{load_room, require_phase, GameError};
use crate::domain::entities::{GamePhase, Response};
use crate::domain::repositories::{AdvanceTurn, RecordResponse, RoomRepository};
use crate::domain::services::{advance_turn, TurnAdvance};

/// Submit response input
pub struct SubmitResponseInput {
    pub room_id: String,
    pub player_id: String,
    pub text: String,
}

/// Submit response use case
///
/// Only the player on turn may answer. The response and the turn advance
/// are committed together.
pub struct SubmitResponse<R: RoomRepository> {
    room_repo: Arc<R>,
}

impl<R: RoomRepository> SubmitResponse<R> {
    pub fn new(room_repo: Arc<R>) -> Self {
        Self { room_repo }
    }

    pub async fn execute(&self, input: SubmitResponseInput) -> Result<TurnAdvance, GameError> {
        let repo = self.room_repo.as_ref();
        let room = load_room(repo, &input.room_id).await?;

        require_phase(&room, GamePhase::Game)?;

        if room.turn_player_id() != Some(input.player_id.as_str()) {
            return Err(GameError::NotYourTurn);
        }

        let advance = advance_turn(room.current_turn_index, room.round_number, room.member_ids.len())
            .ok_or(GameError::NotYourTurn)?;

        let response = Response::new(
            Uuid::new_v4().to_string(),
            room.id.clone(),
            input.player_id,
            room.current_round(),
            input.text,
        );

        repo.record_response(&RecordResponse {
            response,
            advance: AdvanceTurn {
                room_id: room.id.clone(),
                expected_version: room.version,
                current_turn_index: advance.turn_index,
                round_number: advance.round_number,
            },
        })
        .await?;

        Ok(advance)
    }
}
