use std::sync::Arc;

use uuid::Uuid;

use crate::application::{guarded_write_error, load_room, require_phase, GameError};
use crate::domain::entities::{GamePhase, Vote};
use crate::domain::repositories::{CastVote, RoomRepository};

/// Submit vote input
pub struct SubmitVoteInput {
    pub room_id: String,
    pub voter_id: String,
    pub voted_for_id: String,
}

/// Submit vote use case
///
/// A second vote in the same round replaces the first. Votes from different
/// players never conflict. The target is not checked; self-votes and votes
/// for eliminated players are accepted.
pub struct SubmitVote<R: RoomRepository> {
    room_repo: Arc<R>,
}

impl<R: RoomRepository> SubmitVote<R> {
    pub fn new(room_repo: Arc<R>) -> Self {
        Self { room_repo }
    }

    pub async fn execute(&self, input: SubmitVoteInput) -> Result<(), GameError> {
        let repo = self.room_repo.as_ref();
        let room = load_room(repo, &input.room_id).await?;

        require_phase(&room, GamePhase::Voting)?;

        let vote = Vote {
            id: Uuid::new_v4().to_string(),
            room_id: room.id.clone(),
            voter_id: input.voter_id,
            voted_for_id: input.voted_for_id,
            round_number: room.current_round(),
        };

        repo.cast_vote(&CastVote { vote })
            .await
            .map_err(guarded_write_error(GamePhase::Voting))?;

        Ok(())
    }
}
