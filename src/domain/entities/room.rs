use serde::{Deserialize, Serialize};

/// Game phase of a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    Lobby,
    Game,
    Voting,
    Results,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Lobby => "lobby",
            GamePhase::Game => "game",
            GamePhase::Voting => "voting",
            GamePhase::Results => "results",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "lobby" => Some(GamePhase::Lobby),
            "game" => Some(GamePhase::Game),
            "voting" => Some(GamePhase::Voting),
            "results" => Some(GamePhase::Results),
            _ => None,
        }
    }
}

impl std::fmt::Display for GamePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Room entity - the shared game session
///
/// `member_ids` is the turn order. The room owns this listing; players are
/// referenced by id everywhere else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub join_code: String,
    pub host_player_id: String,
    pub phase: GamePhase,
    pub topic: Option<String>,
    pub member_ids: Vec<String>,
    pub current_turn_index: Option<u32>,
    pub round_number: Option<u32>,
    /// Bumped by the store on every committed command
    pub version: i64,
    pub created_at: i64,
}

impl Room {
    /// Create a new room in the lobby, without members yet
    pub fn new(id: String, join_code: String) -> Self {
        Self {
            id,
            join_code,
            host_player_id: String::new(),
            phase: GamePhase::Lobby,
            topic: None,
            member_ids: Vec::new(),
            current_turn_index: None,
            round_number: None,
            version: 0,
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Round used to stamp responses and votes
    pub fn current_round(&self) -> u32 {
        self.round_number.unwrap_or(1)
    }

    /// Player allowed to submit a response right now
    pub fn turn_player_id(&self) -> Option<&str> {
        let index = self.current_turn_index.unwrap_or(0) as usize;
        self.member_ids.get(index).map(String::as_str)
    }

    /// Player at the current turn index, `None` if unset or out of range
    pub fn current_player_id(&self) -> Option<&str> {
        self.current_turn_index
            .and_then(|index| self.member_ids.get(index as usize))
            .map(String::as_str)
    }

    pub fn is_member(&self, player_id: &str) -> bool {
        self.member_ids.iter().any(|id| id == player_id)
    }

    pub fn position_of(&self, player_id: &str) -> Option<usize> {
        self.member_ids.iter().position(|id| id == player_id)
    }

    /// Turn index after removing the member at `removed`, keeping the
    /// same player on turn when possible.
    pub fn turn_index_without(&self, removed: usize) -> Option<u32> {
        let remaining = self.member_ids.len().saturating_sub(1);
        self.current_turn_index.map(|current| {
            let current = current as usize;
            let shifted = if removed < current { current - 1 } else { current };
            if shifted >= remaining {
                0
            } else {
                shifted as u32
            }
        })
    }
}

/// Join code alphabet, without the easily confused 0/O and 1/I
const JOIN_CODE_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Generate a random join code of the given length
pub fn generate_join_code(length: usize) -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..JOIN_CODE_CHARSET.len());
            JOIN_CODE_CHARSET[idx] as char
        })
        .collect()
}

/// Join codes are matched case-insensitively
pub fn normalize_join_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}
