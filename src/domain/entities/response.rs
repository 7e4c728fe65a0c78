use serde::{Deserialize, Serialize};

/// A player's answer for their turn in a round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub id: String,
    pub room_id: String,
    pub player_id: String,
    pub round_number: u32,
    pub text: String,
    pub submitted_at: i64,
}

impl Response {
    pub fn new(id: String, room_id: String, player_id: String, round_number: u32, text: String) -> Self {
        Self {
            id,
            room_id,
            player_id,
            round_number,
            text,
            submitted_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}
