use async_trait::async_trait;

use crate::domain::entities::{GamePhase, Player, Response, Room, Vote};

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    /// The room changed since it was read
    #[error("Concurrent update on room {0}")]
    Conflict(String),
    /// A phase-guarded write found the room in another phase
    #[error("Room is in phase {0}")]
    PhaseMoved(GamePhase),
    #[error("Database error: {0}")]
    Database(String),
}

// ========== Commands ==========
//
// One struct per mutating operation. Each names exactly the fields it may
// write. Room-scoped commands carry the room version they were computed
// from and fail with `Conflict` if it moved. Joins and votes only touch
// their own rows, so they check the phase at write time instead
// (`PhaseMoved`) and never conflict with each other.

/// Insert a room together with its host player
#[derive(Debug, Clone)]
pub struct CreateRoomRecord {
    pub room: Room,
    pub host: Player,
}

/// Append a player to a room that is still in the lobby
#[derive(Debug, Clone)]
pub struct AddMember {
    pub room_id: String,
    pub player: Player,
}

/// Remove a player from a room that keeps at least one member
#[derive(Debug, Clone)]
pub struct RemoveMember {
    pub room_id: String,
    pub expected_version: i64,
    pub player_id: String,
    /// Set when the leaving player was the host
    pub new_host_id: Option<String>,
    pub member_ids: Vec<String>,
    pub current_turn_index: Option<u32>,
}

/// Delete a room along with its last player
#[derive(Debug, Clone)]
pub struct CloseRoom {
    pub room_id: String,
    pub expected_version: i64,
    pub player_id: String,
}

/// Start a round: impostor flags for the pool and the room's round fields
#[derive(Debug, Clone)]
pub struct BeginRound {
    pub room_id: String,
    pub expected_version: i64,
    /// Players whose impostor flag is rewritten; others keep theirs
    pub pool: Vec<String>,
    pub impostor_id: String,
    pub topic: String,
    pub round_number: u32,
}

/// Move the turn pointer
#[derive(Debug, Clone)]
pub struct AdvanceTurn {
    pub room_id: String,
    pub expected_version: i64,
    pub current_turn_index: u32,
    pub round_number: u32,
}

/// Store a response and move the turn pointer in one step
#[derive(Debug, Clone)]
pub struct RecordResponse {
    pub response: Response,
    pub advance: AdvanceTurn,
}

/// Switch the room phase without touching anything else
#[derive(Debug, Clone)]
pub struct ChangePhase {
    pub room_id: String,
    pub expected_version: i64,
    pub phase: GamePhase,
}

/// Insert or overwrite the voter's vote while the room is voting.
/// The vote is filed under the room's round at write time.
#[derive(Debug, Clone)]
pub struct CastVote {
    pub vote: Vote,
}

/// Close a vote: eliminate, score, move to results
#[derive(Debug, Clone)]
pub struct ApplyResults {
    pub room_id: String,
    pub expected_version: i64,
    pub eliminated_id: String,
    pub score_awards: Vec<(String, i64)>,
}

/// Room repository trait
#[async_trait]
pub trait RoomRepository: Send + Sync {
    // ========== Room reads ==========

    /// Find room by ID
    async fn find_by_id(&self, id: &str) -> Result<Option<Room>, RepositoryError>;

    /// Find room by (normalized) join code
    async fn find_by_join_code(&self, code: &str) -> Result<Option<Room>, RepositoryError>;

    // ========== Player reads ==========

    async fn find_player(&self, id: &str) -> Result<Option<Player>, RepositoryError>;

    /// Find multiple players by IDs (batch query - avoids N+1)
    async fn find_players_by_ids(&self, ids: &[String]) -> Result<Vec<Player>, RepositoryError>;

    /// All players indexed under a room, in join order
    async fn find_players_in_room(&self, room_id: &str) -> Result<Vec<Player>, RepositoryError>;

    // ========== Round reads ==========

    /// Responses of one round, oldest first
    async fn find_responses(
        &self,
        room_id: &str,
        round_number: u32,
    ) -> Result<Vec<Response>, RepositoryError>;

    async fn find_votes(&self, room_id: &str, round_number: u32) -> Result<Vec<Vote>, RepositoryError>;

    // ========== Commands ==========

    /// Fails with `AlreadyExists` when the join code is taken
    async fn create_room(&self, record: &CreateRoomRecord) -> Result<(), RepositoryError>;

    async fn add_member(&self, command: &AddMember) -> Result<(), RepositoryError>;

    async fn remove_member(&self, command: &RemoveMember) -> Result<(), RepositoryError>;

    async fn close_room(&self, command: &CloseRoom) -> Result<(), RepositoryError>;

    async fn begin_round(&self, command: &BeginRound) -> Result<(), RepositoryError>;

    async fn advance_turn(&self, command: &AdvanceTurn) -> Result<(), RepositoryError>;

    async fn record_response(&self, command: &RecordResponse) -> Result<(), RepositoryError>;

    async fn change_phase(&self, command: &ChangePhase) -> Result<(), RepositoryError>;

    async fn cast_vote(&self, command: &CastVote) -> Result<(), RepositoryError>;

    async fn apply_results(&self, command: &ApplyResults) -> Result<(), RepositoryError>;

    /// Mark a player eliminated. Returns false if the player does not exist.
    async fn eliminate_player(&self, player_id: &str) -> Result<bool, RepositoryError>;

    /// Add to a player's score, never going below zero.
    /// Returns false if the player does not exist.
    async fn add_to_score(&self, player_id: &str, delta: i64) -> Result<bool, RepositoryError>;
}
