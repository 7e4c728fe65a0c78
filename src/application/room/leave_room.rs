use std::sync::Arc;

use crate::application::{load_player, load_room, GameError};
use crate::domain::repositories::{CloseRoom, RemoveMember, RoomRepository};

/// Leave room input
pub struct LeaveRoomInput {
    pub player_id: String,
}

/// Leave room output
#[derive(Debug, Clone)]
pub struct LeaveRoomOutput {
    pub room_id: String,
    /// The last player left and the room is gone
    pub room_closed: bool,
    pub new_host_id: Option<String>,
}

/// Leave room use case
pub struct LeaveRoom<R: RoomRepository> {
    room_repo: Arc<R>,
}

impl<R: RoomRepository> LeaveRoom<R> {
    pub fn new(room_repo: Arc<R>) -> Self {
        Self { room_repo }
    }

    pub async fn execute(&self, input: LeaveRoomInput) -> Result<LeaveRoomOutput, GameError> {
        let repo = self.room_repo.as_ref();
        let player = load_player(repo, &input.player_id).await?;
        let room = load_room(repo, &player.room_id).await?;

        let remaining: Vec<String> = room
            .member_ids
            .iter()
            .filter(|id| **id != player.id)
            .cloned()
            .collect();

        if remaining.is_empty() {
            repo.close_room(&CloseRoom {
                room_id: room.id.clone(),
                expected_version: room.version,
                player_id: player.id.clone(),
            })
            .await?;

            tracing::info!(room_id = %room.id, "Last player left, room {} closed", room.join_code);
            return Ok(LeaveRoomOutput {
                room_id: room.id,
                room_closed: true,
                new_host_id: None,
            });
        }

        // Host passes to the earliest remaining member
        let new_host_id = if player.is_host || room.host_player_id == player.id {
            remaining.first().cloned()
        } else {
            None
        };

        let current_turn_index = match room.position_of(&player.id) {
            Some(position) => room.turn_index_without(position),
            None => room.current_turn_index,
        };

        repo.remove_member(&RemoveMember {
            room_id: room.id.clone(),
            expected_version: room.version,
            player_id: player.id.clone(),
            new_host_id: new_host_id.clone(),
            member_ids: remaining,
            current_turn_index,
        })
        .await?;

        if let Some(host_id) = &new_host_id {
            tracing::info!(room_id = %room.id, "Host left, {} is the new host", host_id);
        }

        Ok(LeaveRoomOutput {
            room_id: room.id,
            room_closed: false,
            new_host_id,
        })
    }
}
