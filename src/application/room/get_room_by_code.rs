use std::sync::Arc;

use crate::application::room::build_state_view;
use crate::application::GameError;
use crate::domain::entities::normalize_join_code;
use crate::domain::repositories::RoomRepository;
use crate::domain::value_objects::GameStateView;

/// Get room by code input
pub struct GetRoomByCodeInput {
    pub join_code: String,
}

/// Look up a room by its join code. A missing room is not an error.
pub struct GetRoomByCode<R: RoomRepository> {
    room_repo: Arc<R>,
}

impl<R: RoomRepository> GetRoomByCode<R> {
    pub fn new(room_repo: Arc<R>) -> Self {
        Self { room_repo }
    }

    pub async fn execute(&self, input: GetRoomByCodeInput) -> Result<Option<GameStateView>, GameError> {
        let code = normalize_join_code(&input.join_code);
        match self.room_repo.find_by_join_code(&code).await? {
            Some(room) => Ok(Some(build_state_view(self.room_repo.as_ref(), room).await?)),
            None => Ok(None),
        }
    }
}
