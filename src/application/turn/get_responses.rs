use std::collections::HashMap;
use std::sync::Arc;

use crate::application::{load_room, GameError};
use crate::domain::entities::Room;
use crate::domain::repositories::RoomRepository;
use crate::domain::value_objects::ResponseEntry;

/// Shown for responses whose author has left
const UNKNOWN_PLAYER: &str = "Unknown Player";

/// Get responses input
pub struct GetResponsesInput {
    pub room_id: String,
}

/// Responses of the room's current round, oldest first
pub struct GetResponses<R: RoomRepository> {
    room_repo: Arc<R>,
}

impl<R: RoomRepository> GetResponses<R> {
    pub fn new(room_repo: Arc<R>) -> Self {
        Self { room_repo }
    }

    pub async fn execute(&self, input: GetResponsesInput) -> Result<Vec<ResponseEntry>, GameError> {
        let room = load_room(self.room_repo.as_ref(), &input.room_id).await?;
        responses_for_round(self.room_repo.as_ref(), &room).await
    }
}

pub(crate) async fn responses_for_round<R: RoomRepository>(
    repo: &R,
    room: &Room,
) -> Result<Vec<ResponseEntry>, GameError> {
    let responses = repo.find_responses(&room.id, room.current_round()).await?;

    let mut author_ids: Vec<String> = responses.iter().map(|r| r.player_id.clone()).collect();
    author_ids.sort();
    author_ids.dedup();

    let names: HashMap<String, String> = repo
        .find_players_by_ids(&author_ids)
        .await?
        .into_iter()
        .map(|p| (p.id, p.display_name))
        .collect();

    let mut entries: Vec<ResponseEntry> = responses
        .into_iter()
        .map(|r| ResponseEntry {
            player_name: names
                .get(&r.player_id)
                .cloned()
                .unwrap_or_else(|| UNKNOWN_PLAYER.to_string()),
            id: r.id,
            player_id: r.player_id,
            round_number: r.round_number,
            text: r.text,
            submitted_at: r.submitted_at,
        })
        .collect();

    // Stable: equal timestamps keep insertion order
    entries.sort_by_key(|e| e.submitted_at);
    Ok(entries)
}
