use std::sync::Arc;

use crate::application::GameError;
use crate::domain::entities::Player;
use crate::domain::repositories::RoomRepository;

pub struct ListPlayersInput {
    pub room_id: String,
}

/// Players indexed under a room, in join order. An unknown room yields an empty list.
pub struct ListPlayers<R: RoomRepository> {
    room_repo: Arc<R>,
}

impl<R: RoomRepository> ListPlayers<R> {
    pub fn new(room_repo: Arc<R>) -> Self {
        Self { room_repo }
    }

    pub async fn execute(&self, input: ListPlayersInput) -> Result<Vec<Player>, GameError> {
        Ok(self.room_repo.find_players_in_room(&input.room_id).await?)
    }
}
