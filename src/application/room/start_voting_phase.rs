use std::sync::Arc;

use crate::application::{load_room, require_host, require_phase, GameError};
use crate::domain::entities::GamePhase;
use crate::domain::repositories::{ChangePhase, RoomRepository};

/// Start voting phase input
pub struct StartVotingPhaseInput {
    pub room_id: String,
    pub player_id: String,
}

/// Close the discussion of the running round. Only the phase changes.
pub struct StartVotingPhase<R: RoomRepository> {
    room_repo: Arc<R>,
}

impl<R: RoomRepository> StartVotingPhase<R> {
    pub fn new(room_repo: Arc<R>) -> Self {
        Self { room_repo }
    }

    pub async fn execute(&self, input: StartVotingPhaseInput) -> Result<(), GameError> {
        let repo = self.room_repo.as_ref();
        let room = load_room(repo, &input.room_id).await?;

        require_phase(&room, GamePhase::Game)?;
        require_host(repo, &room, &input.player_id).await?;

        repo.change_phase(&ChangePhase {
            room_id: room.id.clone(),
            expected_version: room.version,
            phase: GamePhase::Voting,
        })
        .await?;

        tracing::debug!(room_id = %room.id, "Voting opened");
        Ok(())
    }
}
