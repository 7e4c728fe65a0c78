use std::sync::Arc;

use crate::application::{load_player, GameError, Missing};
use crate::domain::repositories::RoomRepository;

pub struct EliminatePlayerInput {
    pub player_id: String,
}

#[derive(Debug, Clone)]
pub struct EliminatePlayerOutput {
    pub room_id: String,
}

/// Mark a player eliminated outside of a vote
pub struct EliminatePlayer<R: RoomRepository> {
    room_repo: Arc<R>,
}

impl<R: RoomRepository> EliminatePlayer<R> {
    pub fn new(room_repo: Arc<R>) -> Self {
        Self { room_repo }
    }

    pub async fn execute(&self, input: EliminatePlayerInput) -> Result<EliminatePlayerOutput, GameError> {
        let player = load_player(self.room_repo.as_ref(), &input.player_id).await?;

        // The player may have left between the two calls
        if !self.room_repo.eliminate_player(&player.id).await? {
            return Err(GameError::NotFound(Missing::Player));
        }

        tracing::debug!(room_id = %player.room_id, "Player {} eliminated", player.id);
        Ok(EliminatePlayerOutput {
            room_id: player.room_id,
        })
    }
}
