use std::collections::HashMap;
use std::sync::Arc;

use crate::application::{load_room, GameError};
use crate::domain::entities::{Player, Room};
use crate::domain::repositories::RoomRepository;
use crate::domain::value_objects::GameStateView;

/// Get game state input
pub struct GetGameStateInput {
    pub room_id: String,
}

/// Get game state use case
pub struct GetGameState<R: RoomRepository> {
    room_repo: Arc<R>,
}

impl<R: RoomRepository> GetGameState<R> {
    pub fn new(room_repo: Arc<R>) -> Self {
        Self { room_repo }
    }

    pub async fn execute(&self, input: GetGameStateInput) -> Result<GameStateView, GameError> {
        let room = load_room(self.room_repo.as_ref(), &input.room_id).await?;
        build_state_view(self.room_repo.as_ref(), room).await
    }
}

/// Resolve the members of a room in turn order
pub(crate) async fn build_state_view<R: RoomRepository>(
    repo: &R,
    room: Room,
) -> Result<GameStateView, GameError> {
    let found = repo.find_players_by_ids(&room.member_ids).await?;
    let mut by_id: HashMap<String, Player> = found.into_iter().map(|p| (p.id.clone(), p)).collect();

    let players: Vec<Player> = room
        .member_ids
        .iter()
        .filter_map(|id| by_id.remove(id))
        .collect();

    let current_player = room
        .current_player_id()
        .and_then(|id| players.iter().find(|p| p.id == id))
        .cloned();

    Ok(GameStateView {
        room,
        players,
        current_player,
    })
}
