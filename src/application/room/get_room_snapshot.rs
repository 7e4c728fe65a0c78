use std::sync::Arc;

use crate::application::room::build_state_view;
use crate::application::turn::responses_for_round;
use crate::application::{load_room, GameError};
use crate::domain::repositories::RoomRepository;
use crate::domain::value_objects::RoomSnapshot;

/// Get room snapshot input
pub struct GetRoomSnapshotInput {
    pub room_id: String,
}

/// Everything a subscriber needs to render a room, tagged with the room version
pub struct GetRoomSnapshot<R: RoomRepository> {
    room_repo: Arc<R>,
}

impl<R: RoomRepository> GetRoomSnapshot<R> {
    pub fn new(room_repo: Arc<R>) -> Self {
        Self { room_repo }
    }

    pub async fn execute(&self, input: GetRoomSnapshotInput) -> Result<RoomSnapshot, GameError> {
        let repo = self.room_repo.as_ref();
        let room = load_room(repo, &input.room_id).await?;

        let version = room.version;
        let round = room.current_round();
        let responses = responses_for_round(repo, &room).await?;
        let votes = repo.find_votes(&room.id, round).await?;
        let state = build_state_view(repo, room).await?;

        Ok(RoomSnapshot {
            version,
            state,
            responses,
            votes,
        })
    }
}
