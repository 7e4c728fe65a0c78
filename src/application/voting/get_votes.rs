use std::sync::Arc;

use crate::application::{load_room, GameError};
use crate::domain::entities::Vote;
use crate::domain::repositories::RoomRepository;

/// Get votes input
pub struct GetVotesInput {
    pub room_id: String,
}

/// Votes of the room's current round
pub struct GetVotes<R: RoomRepository> {
    room_repo: Arc<R>,
}

impl<R: RoomRepository> GetVotes<R> {
    pub fn new(room_repo: Arc<R>) -> Self {
        Self { room_repo }
    }

    pub async fn execute(&self, input: GetVotesInput) -> Result<Vec<Vote>, GameError> {
        let room = load_room(self.room_repo.as_ref(), &input.room_id).await?;
        Ok(self
            .room_repo
            .find_votes(&room.id, room.current_round())
            .await?)
    }
}
