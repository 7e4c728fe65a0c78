use std::sync::Arc;

use crate::application::{load_player, GameError};
use crate::domain::entities::Player;
use crate::domain::repositories::RoomRepository;

pub struct GetPlayerInput {
    pub player_id: String,
}

/// Get player use case
pub struct GetPlayer<R: RoomRepository> {
    room_repo: Arc<R>,
}

impl<R: RoomRepository> GetPlayer<R> {
    pub fn new(room_repo: Arc<R>) -> Self {
        Self { room_repo }
    }

    pub async fn execute(&self, input: GetPlayerInput) -> Result<Player, GameError> {
        load_player(self.room_repo.as_ref(), &input.player_id).await
    }
}
