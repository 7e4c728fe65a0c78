use serde::{Deserialize, Serialize};

use crate::domain::entities::{Player, Room, Vote};

/// Room with its members resolved, as returned by `getGameState`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateView {
    pub room: Room,
    /// Players in turn order; ids whose record is gone are skipped
    pub players: Vec<Player>,
    pub current_player: Option<Player>,
}

impl GameStateView {
    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }
}

/// Response enriched with the submitter's display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEntry {
    pub id: String,
    pub player_id: String,
    pub player_name: String,
    pub round_number: u32,
    pub text: String,
    pub submitted_at: i64,
}

/// Authoritative state of one room at one version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub version: i64,
    pub state: GameStateView,
    pub responses: Vec<ResponseEntry>,
    pub votes: Vec<Vote>,
}

impl RoomSnapshot {
    pub fn room_id(&self) -> &str {
        &self.state.room.id
    }
}
