use std::sync::Arc;

use crate::application::{load_player, GameError, Missing};
use crate::domain::entities::Player;
use crate::domain::repositories::RoomRepository;

pub struct UpdateScoreInput {
    pub player_id: String,
    /// May be negative; the score never drops below zero
    pub score_increase: i64,
}

/// Adjust a player's score by hand
pub struct UpdateScore<R: RoomRepository> {
    room_repo: Arc<R>,
}

impl<R: RoomRepository> UpdateScore<R> {
    pub fn new(room_repo: Arc<R>) -> Self {
        Self { room_repo }
    }

    pub async fn execute(&self, input: UpdateScoreInput) -> Result<Player, GameError> {
        let repo = self.room_repo.as_ref();

        if !repo.add_to_score(&input.player_id, input.score_increase).await? {
            return Err(GameError::NotFound(Missing::Player));
        }

        load_player(repo, &input.player_id).await
    }
}
