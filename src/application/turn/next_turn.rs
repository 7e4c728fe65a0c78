use std::sync::Arc;

use crate::application::{load_room, require_phase, GameError};
use crate::domain::entities::GamePhase;
use crate::domain::repositories::{AdvanceTurn, RoomRepository};
use crate::domain::services::{advance_turn, TurnAdvance};

/// Next turn input
pub struct NextTurnInput {
    pub room_id: String,
}

/// Move the turn on without a response (host skip)
pub struct NextTurn<R: RoomRepository> {
    room_repo: Arc<R>,
}

impl<R: RoomRepository> NextTurn<R> {
    pub fn new(room_repo: Arc<R>) -> Self {
        Self { room_repo }
    }

    pub async fn execute(&self, input: NextTurnInput) -> Result<TurnAdvance, GameError> {
        let repo = self.room_repo.as_ref();
        let room = load_room(repo, &input.room_id).await?;

        require_phase(&room, GamePhase::Game)?;

        let advance = advance_turn(room.current_turn_index, room.round_number, room.member_ids.len())
            .ok_or(GameError::InsufficientPlayers {
                required: 1,
                actual: 0,
            })?;

        repo.advance_turn(&AdvanceTurn {
            room_id: room.id.clone(),
            expected_version: room.version,
            current_turn_index: advance.turn_index,
            round_number: advance.round_number,
        })
        .await?;

        if advance.lap_completed {
            tracing::debug!(room_id = %room.id, "Lap complete, round {}", advance.round_number);
        }

        Ok(advance)
    }
}
