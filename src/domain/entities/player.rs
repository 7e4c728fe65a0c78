use serde::{Deserialize, Serialize};

/// Player entity - a participant of exactly one room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    pub room_id: String,
    pub display_name: String,
    pub is_impostor: bool,
    pub is_eliminated: bool,
    pub is_host: bool,
    pub score: i64,
    pub joined_at: i64,
}

impl Player {
    /// Create a new player
    pub fn new(id: String, room_id: String, display_name: String, is_host: bool) -> Self {
        Self {
            id,
            room_id,
            display_name,
            is_impostor: false,
            is_eliminated: false,
            is_host,
            score: 0,
            joined_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Still in contention for the impostor draw and as a vote target
    pub fn is_active(&self) -> bool {
        !self.is_eliminated
    }
}
