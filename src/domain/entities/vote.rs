use serde::{Deserialize, Serialize};

/// A voter's pick for a round. At most one per (room, voter, round).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub id: String,
    pub room_id: String,
    pub voter_id: String,
    pub voted_for_id: String,
    pub round_number: u32,
}
