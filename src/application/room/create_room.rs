use std::sync::Arc;

use uuid::Uuid;

use crate::application::GameError;
use crate::domain::entities::{generate_join_code, Player, Room};
use crate::domain::repositories::{CreateRoomRecord, RepositoryError, RoomRepository};
use crate::domain::value_objects::GameRules;

/// Create room input
pub struct CreateRoomInput {
    pub host_display_name: String,
}

/// Create room output
#[derive(Debug, Clone)]
pub struct CreateRoomOutput {
    pub room_id: String,
    pub join_code: String,
    pub host_player_id: String,
}

/// Create room use case
pub struct CreateRoom<R: RoomRepository> {
    room_repo: Arc<R>,
    rules: GameRules,
}

impl<R: RoomRepository> CreateRoom<R> {
    pub fn new(room_repo: Arc<R>, rules: GameRules) -> Self {
        Self { room_repo, rules }
    }

    pub async fn execute(&self, input: CreateRoomInput) -> Result<CreateRoomOutput, GameError> {
        let display_name = self
            .rules
            .clean_display_name(&input.host_display_name)
            .map_err(GameError::Validation)?;

        loop {
            let join_code = self.unused_join_code().await?;
            let room_id = Uuid::new_v4().to_string();
            let host_player_id = Uuid::new_v4().to_string();

            let record = CreateRoomRecord {
                room: Room::new(room_id.clone(), join_code.clone()),
                host: Player::new(host_player_id.clone(), room_id.clone(), display_name.clone(), true),
            };

            match self.room_repo.create_room(&record).await {
                Ok(()) => {
                    tracing::info!(%room_id, %join_code, "Room created by {}", display_name);
                    return Ok(CreateRoomOutput {
                        room_id,
                        join_code,
                        host_player_id,
                    });
                }
                // Another room took the code between the scan and the insert
                Err(RepositoryError::AlreadyExists(code)) => {
                    tracing::debug!("Join code {} was taken concurrently, drawing again", code);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Draw codes until one is not in use
    async fn unused_join_code(&self) -> Result<String, GameError> {
        loop {
            let code = generate_join_code(self.rules.join_code_length);
            if self.room_repo.find_by_join_code(&code).await?.is_none() {
                return Ok(code);
            }
        }
    }
}
