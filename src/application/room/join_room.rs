use std::sync::Arc;

use uuid::Uuid;

use crate::application::{guarded_write_error, require_phase, GameError, Missing};
use crate::domain::entities::{normalize_join_code, GamePhase, Player};
use crate::domain::repositories::{AddMember, RoomRepository};
use crate::domain::value_objects::GameRules;

/// Join room input
pub struct JoinRoomInput {
    pub join_code: String,
    pub display_name: String,
}

/// Join room output
#[derive(Debug, Clone)]
pub struct JoinRoomOutput {
    pub room_id: String,
    pub player_id: String,
}

/// Join room use case
pub struct JoinRoom<R: RoomRepository> {
    room_repo: Arc<R>,
    rules: GameRules,
}

impl<R: RoomRepository> JoinRoom<R> {
    pub fn new(room_repo: Arc<R>, rules: GameRules) -> Self {
        Self { room_repo, rules }
    }

    pub async fn execute(&self, input: JoinRoomInput) -> Result<JoinRoomOutput, GameError> {
        let display_name = self
            .rules
            .clean_display_name(&input.display_name)
            .map_err(GameError::Validation)?;

        let code = normalize_join_code(&input.join_code);
        let room = self
            .room_repo
            .find_by_join_code(&code)
            .await?
            .ok_or(GameError::NotFound(Missing::Room))?;

        // No joining mid-game
        require_phase(&room, GamePhase::Lobby)?;

        let player_id = Uuid::new_v4().to_string();
        let player = Player::new(player_id.clone(), room.id.clone(), display_name, false);

        self.room_repo
            .add_member(&AddMember {
                room_id: room.id.clone(),
                player,
            })
            .await
            .map_err(guarded_write_error(GamePhase::Lobby))?;

        tracing::info!(room_id = %room.id, %player_id, "Player joined room {}", room.join_code);

        Ok(JoinRoomOutput {
            room_id: room.id,
            player_id,
        })
    }
}
